// Token classification for the two dictionary grammars.
//
// Both grammars map an opcode byte onto the same small set of token
// classes; they differ only in which byte ranges mean what. Each grammar
// implements `Grammar::classify`, and a single interpreter
// (`codec::dictionary`) executes the resulting `Token`s.

use crate::error::DecompressError;

/// How many bytes a literal or remember token moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Fixed(usize),
    /// An Encoded Value follows, counting 16-bit words.
    EncodedWords,
    /// An Encoded Value follows, counting bytes.
    EncodedBytes,
}

/// Where a reuse token gets its dictionary index from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    /// Carried in the token itself.
    Embedded(usize),
    /// One following byte, plus `bias`.
    Byte { bias: usize },
    /// One following big-endian word, plus `bias`.
    Word { bias: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Stop successfully.
    End,
    /// A token that never occurs in a well-formed stream; decoding stops.
    Stop,
    /// Escape into an extended operation.
    Extended,
    /// Emit a constant word, big-endian.
    Constant(u16),
    /// Copy bytes from input to output.
    Literal(Length),
    /// Copy bytes from input to output and remember them.
    Remember(Length),
    /// Copy a dictionary entry to output.
    Reuse(IndexSource),
}

/// An opcode partition over the shared token classes.
pub trait Grammar {
    /// Name used in diagnostics.
    const NAME: &'static str;

    fn classify(op: u8) -> Result<Token, DecompressError>;
}

/// `(low nibble) * 2 + 2`.
#[inline]
pub(crate) fn word_length(op: u8) -> usize {
    usize::from(op & 0x0F) * 2 + 2
}
