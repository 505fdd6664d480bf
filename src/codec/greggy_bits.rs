// GreggyBits: byte-to-word table expansion (header version 9, defProcID 2).
//
// Each input byte names one of 256 words. The table is the static default
// unless the header says a dynamic prefix follows it. In bitmap mode the
// payload is split into runs of up to 32 words, each preceded by a
// big-endian bitmap whose set bits (MSB first) mark table-expanded words
// and whose clear bits mark literal words.

use std::borrow::Cow;

use log::{debug, trace};

use super::context::{DecodeContext, Decoded};
use crate::error::DecompressError;
use crate::format::header::{CompressFlags, FormatParams, PAYLOAD_OFFSET, ResourceHeader};
use crate::format::tables::STATIC_BYTE_TABLE;

/// Words per full bitmap run.
pub const RUN_WORDS: usize = 32;

/// The default byte expansion table.
pub fn static_table() -> &'static [u16; 256] {
    &STATIC_BYTE_TABLE
}

/// The expansion table in effect for one decode. Borrows the static table
/// unless a dynamic prefix was loaded.
#[derive(Debug, Clone)]
pub struct ByteTable(Cow<'static, [u16; 256]>);

impl ByteTable {
    pub fn from_static() -> Self {
        Self(Cow::Borrowed(&STATIC_BYTE_TABLE))
    }

    /// Read `entries` big-endian words over the front of the static table.
    pub fn load(ctx: &mut DecodeContext<'_>, entries: usize) -> Result<Self, DecompressError> {
        let bytes = ctx.read_bytes(entries * 2)?;
        let mut table = STATIC_BYTE_TABLE;
        for (slot, word) in table.iter_mut().zip(bytes.chunks_exact(2)) {
            *slot = u16::from_be_bytes([word[0], word[1]]);
        }
        Ok(Self(Cow::Owned(table)))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.0, Cow::Owned(_))
    }

    #[inline]
    pub fn expand(&self, byte: u8) -> u16 {
        self.0[usize::from(byte)]
    }
}

/// Decode a complete version 9 GreggyBits resource.
pub fn decompress(input: &[u8], debug: bool) -> Result<Decoded, DecompressError> {
    let header = ResourceHeader::parse(input)?;
    let FormatParams::GreggyBits(params) = header.format else {
        return Err(DecompressError::BadExtResource);
    };
    let size = header.common.actual_size as usize;

    let mut ctx = DecodeContext::new(input, PAYLOAD_OFFSET, size)?.with_debug(debug);
    if let Err(e) = expand(&mut ctx, params.byte_table_size, params.compress_flags) {
        return Err(ctx.fail(e));
    }

    let decoded = ctx.finish();
    if debug {
        debug!("{}", decoded.stats);
    }
    debug!(
        "GreggyBits: {} bytes from {} input bytes",
        decoded.data.len(),
        decoded.stats.bytes_read
    );
    Ok(decoded)
}

fn expand(
    ctx: &mut DecodeContext<'_>,
    byte_table_size: u8,
    flags: CompressFlags,
) -> Result<(), DecompressError> {
    let table = if flags.contains(CompressFlags::BYTE_TABLE_SAVED) {
        ByteTable::load(ctx, usize::from(byte_table_size) + 1)?
    } else {
        ByteTable::from_static()
    };
    trace!(
        "GreggyBits: {} table, flags {:#04X}",
        if table.is_dynamic() { "dynamic" } else { "static" },
        flags.bits()
    );

    if flags.contains(CompressFlags::BITMAPPED_DATA) {
        expand_bitmapped(ctx, &table)?;
    } else {
        expand_plain(ctx, &table)?;
    }
    copy_odd_byte(ctx)
}

/// One table word per input byte, up to `limit / 2` words.
fn expand_plain(ctx: &mut DecodeContext<'_>, table: &ByteTable) -> Result<(), DecompressError> {
    for _ in 0..ctx.output_limit() / 2 {
        if !ctx.has_input() {
            break;
        }
        let byte = ctx.read_u8()?;
        ctx.write_u16(table.expand(byte))?;
    }
    Ok(())
}

/// `run_count:u8 last_run_words:u8`, then per run a bitmap and its words.
fn expand_bitmapped(ctx: &mut DecodeContext<'_>, table: &ByteTable) -> Result<(), DecompressError> {
    let runs = usize::from(ctx.read_u8()?);
    let last_run_words = usize::from(ctx.read_u8()?);

    for run in 0..runs {
        let words = if run + 1 == runs && last_run_words > 0 {
            last_run_words.min(RUN_WORDS)
        } else {
            RUN_WORDS
        };
        let bitmap = ctx.read_u32()?;
        trace!("GreggyBits: run {run}, {words} words, bitmap {bitmap:#010X}");

        for bit in 0..words {
            if bitmap & (0x8000_0000 >> bit) != 0 {
                let byte = ctx.read_u8()?;
                ctx.write_u16(table.expand(byte))?;
            } else {
                ctx.copy_literal(2)?;
            }
        }
    }
    Ok(())
}

/// An odd-sized output ends with one byte copied through unexpanded.
fn copy_odd_byte(ctx: &mut DecodeContext<'_>) -> Result<(), DecompressError> {
    if ctx.output_limit() % 2 == 1 && ctx.remaining_output() > 0 && ctx.has_input() {
        ctx.copy_literal(1)?;
    }
    Ok(())
}
