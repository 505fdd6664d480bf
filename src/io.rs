// File-level helpers.
//
// `decompress_file()` reads a resource blob, runs it through an engine and
// writes the result. Optionally computes a SHA-256 of the output
// (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::engine::{self, Engine, Method};
use crate::error::DecompressError;
use crate::format::header::{ExtendedHeader, ResourceHeader, is_extended_resource};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `decompress_file()`.
#[derive(Debug, Clone)]
pub struct DecompressFileStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Decompressed output size in bytes.
    pub output_size: u64,
    /// Decoder used, or `None` for plain and uncompressed resources.
    pub method: Option<Method>,
    /// SHA-256 of the output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("decompression error: {0}")]
    Decompress(#[from] DecompressError),
}

// ---------------------------------------------------------------------------
// decompress_file
// ---------------------------------------------------------------------------

/// Decompress `input_path` with the default engine, writing to `output_path`.
pub fn decompress_file(
    input_path: &Path,
    output_path: &Path,
) -> Result<DecompressFileStats, IoError> {
    let input = std::fs::read(input_path)?;
    let output = engine::decompress_resource(&input)?;
    write_output(&input, &output, output_path)
}

/// As `decompress_file()`, with an explicit engine.
pub fn decompress_file_with(
    engine: &mut Engine,
    input_path: &Path,
    output_path: &Path,
) -> Result<DecompressFileStats, IoError> {
    let input = std::fs::read(input_path)?;
    let output = engine.decompress_resource(&input)?;
    write_output(&input, &output, output_path)
}

/// The decoder a blob would be dispatched to, if any.
pub fn detect_method(input: &[u8]) -> Result<Option<Method>, DecompressError> {
    if !is_extended_resource(input) {
        return Ok(None);
    }
    match ExtendedHeader::parse(input) {
        Some(common) if common.is_compressed() => {
            Method::select(&ResourceHeader::parse(input)?).map(Some)
        }
        _ => Ok(None),
    }
}

fn write_output(
    input: &[u8],
    output: &[u8],
    output_path: &Path,
) -> Result<DecompressFileStats, IoError> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    writer.write_all(output)?;
    writer.flush()?;

    Ok(DecompressFileStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        method: detect_method(input)?,
        output_sha256: sha256(output),
    })
}

#[cfg(feature = "file-io")]
fn sha256(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex rendering for digests.
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
