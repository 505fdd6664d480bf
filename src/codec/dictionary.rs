// Token interpreter for the dictionary grammars (DonnBits and byte-wise).
//
// Both read a version 8 header, size a variable table from its ratio and
// then execute tokens until the end token, until input runs out, or until
// the output buffer is full.

use log::{debug, trace};

use super::context::{DecodeContext, Decoded};
use super::extended::handle_extended;
use super::token::{Grammar, IndexSource, Length, Token};
use super::var_table::VarTable;
use crate::error::DecompressError;
use crate::format::header::{FormatParams, PAYLOAD_OFFSET, ResourceHeader};

/// Parse the header of `input` and decode its token stream with grammar `G`.
pub fn decompress<G: Grammar>(input: &[u8], debug: bool) -> Result<Decoded, DecompressError> {
    let header = ResourceHeader::parse(input)?;
    let FormatParams::DonnBits(params) = header.format else {
        return Err(DecompressError::BadExtResource);
    };
    let size = header.common.actual_size as usize;

    let mut ctx = DecodeContext::new(input, PAYLOAD_OFFSET, size)?.with_debug(debug);
    let mut table = VarTable::new(params.var_table_ratio, size)?;

    if let Err(e) = decode_tokens::<G>(&mut ctx, &mut table) {
        return Err(ctx.fail(e));
    }

    let decoded = ctx.finish();
    if debug {
        debug!("{table}");
        debug!("{}", decoded.stats);
    }
    debug!(
        "{}: {} bytes from {} input bytes, {} vars stored, {} reused",
        G::NAME,
        decoded.data.len(),
        decoded.stats.bytes_read,
        decoded.stats.vars_stored,
        decoded.stats.vars_reused
    );
    Ok(decoded)
}

/// Execute tokens from the context's cursor.
pub fn decode_tokens<G: Grammar>(
    ctx: &mut DecodeContext<'_>,
    table: &mut VarTable,
) -> Result<(), DecompressError> {
    while ctx.has_input() && !ctx.output_full() {
        let op = ctx.read_u8()?;
        let token = G::classify(op)?;
        trace!("{} {op:#04X} -> {token:?}", G::NAME);

        match token {
            Token::End => break,
            Token::Stop => {
                debug!(
                    "{}: stop token {op:#04X} at input offset {}",
                    G::NAME,
                    ctx.position() - 1
                );
                break;
            }
            Token::Extended => handle_extended(ctx)?,
            Token::Constant(word) => ctx.write_u16(word)?,
            Token::Literal(length) => {
                let len = read_length(ctx, length)?;
                ctx.copy_literal(len)?;
            }
            Token::Remember(length) => {
                let len = read_length(ctx, length)?;
                let bytes = ctx.copy_literal(len)?;
                table.remember(bytes)?;
                ctx.stats_mut().vars_stored += 1;
            }
            Token::Reuse(source) => {
                let index = read_index(ctx, source)?;
                ctx.write_bytes(table.fetch(index)?)?;
                ctx.stats_mut().vars_reused += 1;
            }
        }
    }
    Ok(())
}

fn read_length(ctx: &mut DecodeContext<'_>, length: Length) -> Result<usize, DecompressError> {
    match length {
        Length::Fixed(len) => Ok(len),
        Length::EncodedBytes => Ok(ctx.read_encoded()? as u32 as usize),
        Length::EncodedWords => (ctx.read_encoded()? as u32 as usize)
            .checked_mul(2)
            .ok_or(DecompressError::InputOutOfBounds),
    }
}

fn read_index(ctx: &mut DecodeContext<'_>, source: IndexSource) -> Result<usize, DecompressError> {
    Ok(match source {
        IndexSource::Embedded(index) => index,
        IndexSource::Byte { bias } => usize::from(ctx.read_u8()?) + bias,
        IndexSource::Word { bias } => usize::from(ctx.read_u16()?) + bias,
    })
}
