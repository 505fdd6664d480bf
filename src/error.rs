// Decompression error taxonomy.
//
// Every failure maps onto one of the legacy Resource Manager result codes
// via `DecompressError::code()`, so callers that still speak integers can
// keep doing so.

use thiserror::Error;

/// `noErr`.
pub const NO_ERR: i32 = 0;
/// `memFullErr`: a buffer could not be obtained.
pub const MEM_FULL_ERR: i32 = -108;
/// `badExtResource`: extended header names a format nobody can decode.
pub const BAD_EXT_RESOURCE: i32 = -185;
/// `CantDecompress`: unrecognized token, sub-opcode or constant index.
pub const CANT_DECOMPRESS: i32 = -186;
/// `inputOutOfBounds`: read past the end of the compressed data.
pub const INPUT_OUT_OF_BOUNDS: i32 = -190;
/// `outputOutOfBounds`: write past the end of the output buffer.
pub const OUTPUT_OUT_OF_BOUNDS: i32 = -191;

/// Errors produced while classifying or decoding a resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("input buffer underrun")]
    InputOutOfBounds,

    #[error("output buffer overrun")]
    OutputOutOfBounds,

    /// The variable table arena has no room for another entry.
    #[error("variable table full: need {needed} bytes, {available} available")]
    DictionaryFull { needed: usize, available: usize },

    /// A reuse token named an entry that has not been remembered yet.
    #[error("variable table index {index} out of range ({entries} entries)")]
    DictionaryIndex { index: usize, entries: usize },

    #[error("can't decompress resource: {0}")]
    CantDecompress(String),

    #[error("bad extended resource format")]
    BadExtResource,

    #[error("not enough memory for {bytes} bytes")]
    MemFull { bytes: usize },

    #[error("header truncated: need {needed} bytes, have {actual}")]
    TruncatedHeader { needed: usize, actual: usize },

    /// Failure reported by a registered custom decompressor.
    #[error("custom decompressor {id} failed: {message}")]
    Custom { id: u16, message: String },

    #[error("decompressor registry full ({capacity} entries)")]
    RegistryFull { capacity: usize },
}

impl DecompressError {
    /// The legacy numeric result code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Self::InputOutOfBounds | Self::DictionaryFull { .. } | Self::DictionaryIndex { .. } => {
                INPUT_OUT_OF_BOUNDS
            }
            Self::OutputOutOfBounds => OUTPUT_OUT_OF_BOUNDS,
            Self::CantDecompress(_) | Self::Custom { .. } => CANT_DECOMPRESS,
            Self::BadExtResource => BAD_EXT_RESOURCE,
            // A truncated header surfaces as the legacy init failure.
            Self::MemFull { .. } | Self::TruncatedHeader { .. } => MEM_FULL_ERR,
            Self::RegistryFull { .. } => -1,
        }
    }

    pub(crate) fn cant(msg: impl Into<String>) -> Self {
        Self::CantDecompress(msg.into())
    }
}

/// Human-readable description of a legacy result code.
pub fn error_string(code: i32) -> &'static str {
    match code {
        NO_ERR => "No error",
        CANT_DECOMPRESS => "Can't decompress resource",
        BAD_EXT_RESOURCE => "Bad extended resource format",
        INPUT_OUT_OF_BOUNDS => "Input out of bounds",
        OUTPUT_OUT_OF_BOUNDS => "Output out of bounds",
        MEM_FULL_ERR => "Not enough memory",
        _ => "Unknown error",
    }
}

/// Allocate a zeroed buffer of `len` bytes, reporting allocator refusal
/// instead of aborting.
pub(crate) fn try_zeroed(len: usize) -> Result<Vec<u8>, DecompressError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DecompressError::MemFull { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Allocate an empty buffer able to hold `len` bytes without reallocating.
pub(crate) fn try_with_capacity(len: usize) -> Result<Vec<u8>, DecompressError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DecompressError::MemFull { bytes: len })?;
    Ok(buf)
}

/// Copy `data` into a freshly allocated buffer.
pub(crate) fn try_copy(data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    let mut buf = try_with_capacity(data.len())?;
    buf.extend_from_slice(data);
    Ok(buf)
}
