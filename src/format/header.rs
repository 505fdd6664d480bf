// Extended resource header parsing.
//
// Layout (all fields big-endian):
//
//   0   u32  resource size (owned by the resource store, not interpreted here)
//   4   u32  signature (ROBUSTNESS_SIGNATURE)
//   8   u16  header length
//   10  u8   header version
//   11  u8   extended attributes
//   12  u32  actual (decompressed) size
//   16  ..   format-specific fields, 6 bytes for versions 8 and 9
//
// The token stream begins at PAYLOAD_OFFSET.

use std::fmt;

use bitflags::bitflags;

use crate::error::DecompressError;

/// Unimplemented-instruction trap word followed by 'er'.
pub const ROBUSTNESS_SIGNATURE: u32 = 0xA89F_6572;

/// Leading resource-size field that precedes the header proper.
pub const RESOURCE_SIZE_FIELD_LEN: usize = 4;

/// Signature through actual size.
pub const COMMON_HEADER_LEN: usize = 12;

/// Common fields plus the 6 format-specific bytes.
pub const FORMAT_HEADER_LEN: usize = 18;

/// Offset of the first token (or dynamic byte table) in the blob.
pub const PAYLOAD_OFFSET: usize = RESOURCE_SIZE_FIELD_LEN + FORMAT_HEADER_LEN;

pub const DONN_HEADER_VERSION: u8 = 8;
pub const GREGGY_HEADER_VERSION: u8 = 9;

/// `decompressID` selecting the word-oriented DonnBits grammar.
pub const DCMP_DONN_BITS: u8 = 0;
/// `decompressID` selecting the byte-wise grammar.
pub const DCMP_BYTE_WISE: u8 = 1;
/// `defProcID` naming the GreggyBits decompressor.
pub const DCMP_GREGGY_BITS: u16 = 2;

bitflags! {
    /// Extended attribute byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExtendedAttributes: u8 {
        const COMPRESSED = 0x01;
    }
}

bitflags! {
    /// GreggyBits `compressFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompressFlags: u8 {
        /// A dynamic byte table follows the header.
        const BYTE_TABLE_SAVED = 0x01;
        /// Payload is organized as bitmap-prefixed runs.
        const BITMAPPED_DATA = 0x02;
    }
}

// ---------------------------------------------------------------------------
// Common header
// ---------------------------------------------------------------------------

/// Fields shared by every extended resource header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeader {
    pub signature: u32,
    pub header_length: u16,
    pub header_version: u8,
    pub attributes: ExtendedAttributes,
    pub actual_size: u32,
}

impl ExtendedHeader {
    /// Parse the common header from a full resource blob (including the
    /// leading size field). Returns `None` if the blob is too short.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let h = data.get(RESOURCE_SIZE_FIELD_LEN..RESOURCE_SIZE_FIELD_LEN + COMMON_HEADER_LEN)?;
        Some(Self {
            signature: u32::from_be_bytes([h[0], h[1], h[2], h[3]]),
            header_length: u16::from_be_bytes([h[4], h[5]]),
            header_version: h[6],
            attributes: ExtendedAttributes::from_bits_retain(h[7]),
            actual_size: u32::from_be_bytes([h[8], h[9], h[10], h[11]]),
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.attributes.contains(ExtendedAttributes::COMPRESSED)
    }
}

/// True iff `data` is long enough for a header and carries the signature.
pub fn is_extended_resource(data: &[u8]) -> bool {
    ExtendedHeader::parse(data).is_some_and(|h| h.signature == ROBUSTNESS_SIGNATURE)
}

/// Tests the compressed bit of the extended attributes.
pub fn is_compressed_resource(header: &ExtendedHeader) -> bool {
    header.is_compressed()
}

/// Final decompressed length declared by the header.
pub fn decompressed_size(header: &ExtendedHeader) -> usize {
    header.actual_size as usize
}

// ---------------------------------------------------------------------------
// Format-specific headers
// ---------------------------------------------------------------------------

/// Version 8 fields, shared by DonnBits and the byte-wise grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonnBitsParams {
    pub var_table_ratio: u8,
    pub over_run: u16,
    pub decompress_id: u8,
    pub ctable_id: u16,
}

/// Version 9 (and later) fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreggyBitsParams {
    pub def_proc_id: u16,
    pub decompress_slop: u16,
    pub byte_table_size: u8,
    pub compress_flags: CompressFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatParams {
    DonnBits(DonnBitsParams),
    GreggyBits(GreggyBitsParams),
    /// A version this crate knows no layout for.
    Unknown,
}

/// Fully parsed header, discriminated by `header_version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceHeader {
    pub common: ExtendedHeader,
    pub format: FormatParams,
}

impl ResourceHeader {
    /// Parse the common header and, for known versions, its format fields.
    pub fn parse(data: &[u8]) -> Result<Self, DecompressError> {
        let common = ExtendedHeader::parse(data).ok_or(DecompressError::TruncatedHeader {
            needed: RESOURCE_SIZE_FIELD_LEN + COMMON_HEADER_LEN,
            actual: data.len(),
        })?;

        let version = common.header_version;
        if version < DONN_HEADER_VERSION {
            return Ok(Self {
                common,
                format: FormatParams::Unknown,
            });
        }

        let f = data
            .get(RESOURCE_SIZE_FIELD_LEN + COMMON_HEADER_LEN..PAYLOAD_OFFSET)
            .ok_or(DecompressError::TruncatedHeader {
                needed: PAYLOAD_OFFSET,
                actual: data.len(),
            })?;

        let format = if version == DONN_HEADER_VERSION {
            FormatParams::DonnBits(DonnBitsParams {
                var_table_ratio: f[0],
                over_run: u16::from_be_bytes([f[1], f[2]]),
                decompress_id: f[3],
                ctable_id: u16::from_be_bytes([f[4], f[5]]),
            })
        } else {
            FormatParams::GreggyBits(GreggyBitsParams {
                def_proc_id: u16::from_be_bytes([f[0], f[1]]),
                decompress_slop: u16::from_be_bytes([f[2], f[3]]),
                byte_table_size: f[4],
                compress_flags: CompressFlags::from_bits_retain(f[5]),
            })
        };

        Ok(Self { common, format })
    }

    /// The id a custom decompressor would be registered under.
    pub fn decompressor_id(&self) -> Option<u16> {
        match self.format {
            FormatParams::DonnBits(p) => Some(u16::from(p.decompress_id)),
            FormatParams::GreggyBits(p) => Some(p.def_proc_id),
            FormatParams::Unknown => None,
        }
    }

    /// Offset of the payload for declared-uncompressed and custom formats.
    pub fn data_offset(&self) -> usize {
        RESOURCE_SIZE_FIELD_LEN + usize::from(self.common.header_length)
    }

    /// A compressed version 8 header.
    pub fn donn_bits(actual_size: u32, var_table_ratio: u8, decompress_id: u8) -> Self {
        Self {
            common: ExtendedHeader::compressed(DONN_HEADER_VERSION, actual_size),
            format: FormatParams::DonnBits(DonnBitsParams {
                var_table_ratio,
                over_run: 0,
                decompress_id,
                ctable_id: 0,
            }),
        }
    }

    /// A compressed version 9 header.
    pub fn greggy_bits(
        actual_size: u32,
        def_proc_id: u16,
        byte_table_size: u8,
        compress_flags: CompressFlags,
    ) -> Self {
        Self {
            common: ExtendedHeader::compressed(GREGGY_HEADER_VERSION, actual_size),
            format: FormatParams::GreggyBits(GreggyBitsParams {
                def_proc_id,
                decompress_slop: 0,
                byte_table_size,
                compress_flags,
            }),
        }
    }

    /// Serialize the header, including a zero resource-size field.
    ///
    /// Unknown formats write only the common fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        let c = &self.common;
        let mut out = Vec::with_capacity(PAYLOAD_OFFSET);
        out.extend_from_slice(&[0; RESOURCE_SIZE_FIELD_LEN]);
        out.extend_from_slice(&c.signature.to_be_bytes());
        out.extend_from_slice(&c.header_length.to_be_bytes());
        out.push(c.header_version);
        out.push(c.attributes.bits());
        out.extend_from_slice(&c.actual_size.to_be_bytes());
        match self.format {
            FormatParams::DonnBits(p) => {
                out.push(p.var_table_ratio);
                out.extend_from_slice(&p.over_run.to_be_bytes());
                out.push(p.decompress_id);
                out.extend_from_slice(&p.ctable_id.to_be_bytes());
            }
            FormatParams::GreggyBits(p) => {
                out.extend_from_slice(&p.def_proc_id.to_be_bytes());
                out.extend_from_slice(&p.decompress_slop.to_be_bytes());
                out.push(p.byte_table_size);
                out.push(p.compress_flags.bits());
            }
            FormatParams::Unknown => {}
        }
        out
    }
}

impl ExtendedHeader {
    fn compressed(header_version: u8, actual_size: u32) -> Self {
        Self {
            signature: ROBUSTNESS_SIGNATURE,
            header_length: FORMAT_HEADER_LEN as u16,
            header_version,
            attributes: ExtendedAttributes::COMPRESSED,
            actual_size,
        }
    }
}

impl fmt::Display for ResourceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.common;
        writeln!(f, "Resource header:")?;
        writeln!(f, "  Signature:           {:#010X}", c.signature)?;
        writeln!(f, "  Header length:       {}", c.header_length)?;
        writeln!(f, "  Header version:      {}", c.header_version)?;
        writeln!(f, "  Extended attributes: {:#04X}", c.attributes.bits())?;
        write!(f, "  Actual size:         {}", c.actual_size)?;
        match self.format {
            FormatParams::DonnBits(p) => {
                writeln!(f)?;
                writeln!(f, "  Var table ratio:     {}", p.var_table_ratio)?;
                writeln!(f, "  Overrun:             {}", p.over_run)?;
                writeln!(f, "  Decompress ID:       {}", p.decompress_id)?;
                write!(f, "  CTable ID:           {}", p.ctable_id)
            }
            FormatParams::GreggyBits(p) => {
                writeln!(f)?;
                writeln!(f, "  DefProc ID:          {}", p.def_proc_id)?;
                writeln!(f, "  Decompress slop:     {}", p.decompress_slop)?;
                writeln!(f, "  Byte table size:     {}", p.byte_table_size)?;
                write!(f, "  Compress flags:      {:#04X}", p.compress_flags.bits())
            }
            FormatParams::Unknown => Ok(()),
        }
    }
}
