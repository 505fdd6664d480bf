// Decode context: the input cursor, the bounded output buffer and running
// statistics.
//
// Every read and write is bounds-checked before it touches memory. The
// output never grows past the limit fixed at construction, and only grows
// as bytes are written.

use std::fmt;

use log::warn;

use crate::checksum::checksum;
use crate::error::DecompressError;
use crate::format::encoded;

/// Output reserved before the first write.
const INITIAL_OUTPUT_RESERVE: usize = 64 * 1024;

/// Statistics gathered over one decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecompressStats {
    /// Compressed bytes consumed after the header.
    pub bytes_read: usize,
    /// Bytes appended to the output.
    pub bytes_written: usize,
    /// Variable table entries created.
    pub vars_stored: usize,
    /// Variable table entries copied back out.
    pub vars_reused: usize,
    /// Checksum of the final output, set when decoding finishes.
    pub checksum: u32,
}

impl fmt::Display for DecompressStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Decompression statistics:")?;
        writeln!(f, "  Bytes read:    {}", self.bytes_read)?;
        writeln!(f, "  Bytes written: {}", self.bytes_written)?;
        writeln!(f, "  Vars stored:   {}", self.vars_stored)?;
        writeln!(f, "  Vars reused:   {}", self.vars_reused)?;
        write!(f, "  Checksum:      {:#010X}", self.checksum)
    }
}

/// Output of a finished decode. Owns the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub data: Vec<u8>,
    pub stats: DecompressStats,
}

pub struct DecodeContext<'a> {
    input: &'a [u8],
    pos: usize,
    output: Vec<u8>,
    limit: usize,
    stats: DecompressStats,
    debug: bool,
}

impl<'a> DecodeContext<'a> {
    /// Start reading `input` at `start` and allow up to `limit` output bytes.
    pub fn new(input: &'a [u8], start: usize, limit: usize) -> Result<Self, DecompressError> {
        if start > input.len() {
            return Err(DecompressError::TruncatedHeader {
                needed: start,
                actual: input.len(),
            });
        }
        Ok(Self {
            input,
            pos: start,
            output: crate::error::try_with_capacity(limit.min(INITIAL_OUTPUT_RESERVE))?,
            limit,
            stats: DecompressStats::default(),
            debug: false,
        })
    }

    /// Report errors at `warn` as they are recorded.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    // -- input ---------------------------------------------------------------

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining_input(&self) -> usize {
        self.input.len() - self.pos
    }

    pub fn has_input(&self) -> bool {
        self.pos < self.input.len()
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecompressError> {
        let &b = self
            .input
            .get(self.pos)
            .ok_or(DecompressError::InputOutOfBounds)?;
        self.advance(1);
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecompressError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecompressError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Borrow the next `len` input bytes and step past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecompressError> {
        let input: &'a [u8] = self.input;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= input.len())
            .ok_or(DecompressError::InputOutOfBounds)?;
        let bytes = &input[self.pos..end];
        self.advance(len);
        Ok(bytes)
    }

    /// Read one Encoded Value.
    pub fn read_encoded(&mut self) -> Result<i32, DecompressError> {
        let (value, used) = encoded::read_encoded(&self.input[self.pos..])?;
        self.advance(used);
        Ok(value)
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.stats.bytes_read += n;
    }

    // -- output --------------------------------------------------------------

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn output_limit(&self) -> usize {
        self.limit
    }

    pub fn remaining_output(&self) -> usize {
        self.limit - self.output.len()
    }

    pub fn output_full(&self) -> bool {
        self.output.len() >= self.limit
    }

    /// Fail unless `len` more bytes fit in the output.
    #[inline]
    pub fn ensure_output(&self, len: usize) -> Result<(), DecompressError> {
        if len > self.remaining_output() {
            return Err(DecompressError::OutputOutOfBounds);
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), DecompressError> {
        self.ensure_output(data.len())?;
        self.output
            .try_reserve(data.len())
            .map_err(|_| DecompressError::MemFull { bytes: data.len() })?;
        self.output.extend_from_slice(data);
        self.stats.bytes_written += data.len();
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), DecompressError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), DecompressError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), DecompressError> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// Copy `len` bytes straight from input to output.
    pub fn copy_literal(&mut self, len: usize) -> Result<&'a [u8], DecompressError> {
        if len > self.remaining_input() {
            return Err(DecompressError::InputOutOfBounds);
        }
        self.ensure_output(len)?;
        let bytes = self.read_bytes(len)?;
        self.write_bytes(bytes)?;
        Ok(bytes)
    }

    // -- bookkeeping ---------------------------------------------------------

    pub fn stats(&self) -> &DecompressStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut DecompressStats {
        &mut self.stats
    }

    /// Report `err` with the cursor position and hand it back for propagation.
    pub fn fail(&self, err: DecompressError) -> DecompressError {
        if self.debug {
            warn!(
                "decompression error {} at input offset {}, {} bytes written: {err}",
                err.code(),
                self.pos,
                self.output.len()
            );
        }
        err
    }

    /// Seal the output: compute its checksum and take ownership of the buffer.
    pub fn finish(mut self) -> Decoded {
        self.stats.checksum = checksum(&self.output);
        Decoded {
            data: self.output,
            stats: self.stats,
        }
    }
}
