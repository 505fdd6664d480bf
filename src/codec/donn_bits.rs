// DonnBits: the word-oriented dictionary grammar.
//
//   0x00         stop
//   0x01         literal, encoded word count
//   0x02..=0x3F  literal, (low nibble * 2 + 2) bytes
//   0x40         remember, encoded word count
//   0x41..=0x47  remember, ((op - 0x40) * 2 + 2) bytes
//   0x48..=0x9F  constant word (also 0xF8..=0xFA)
//   0xA0..=0xAF  reuse, index = next byte + 40
//   0xB0..=0xBF  reuse, index = next byte + 296
//   0xC0..=0xCF  reuse, index = next word + 40
//   0xD0..=0xF7  reuse, index = op - 0xD0
//   0xFB, 0xFD   extended operation
//   0xFC         past the constant table
//   0xFE         remember, 30 bytes
//   0xFF         end

use super::context::Decoded;
use super::dictionary;
use super::token::{Grammar, IndexSource, Length, Token, word_length};
use crate::error::DecompressError;
use crate::format::tables::{DONN_BITS_FIRST_CONSTANT, DONN_BITS_WORDS};

/// Entries reachable through a one-byte reuse token.
pub const MAX_1BYTE_REUSE: usize = 40;

/// Bias of the `0xB0..=0xBF` reuse range: one byte-indexed page past the first.
const SECOND_PAGE_BIAS: usize = MAX_1BYTE_REUSE + 256;

pub struct DonnBits;

impl Grammar for DonnBits {
    const NAME: &'static str = "DonnBits";

    fn classify(op: u8) -> Result<Token, DecompressError> {
        Ok(match op {
            0xFF => Token::End,
            0xFB | 0xFD => Token::Extended,
            0xFE => Token::Remember(Length::Fixed(word_length(op - 0x40))),
            0xD0..=0xF7 => Token::Reuse(IndexSource::Embedded(usize::from(op - 0xD0))),
            0xA0..=0xAF => Token::Reuse(IndexSource::Byte {
                bias: MAX_1BYTE_REUSE,
            }),
            0xB0..=0xBF => Token::Reuse(IndexSource::Byte {
                bias: SECOND_PAGE_BIAS,
            }),
            0xC0..=0xCF => Token::Reuse(IndexSource::Word {
                bias: MAX_1BYTE_REUSE,
            }),
            DONN_BITS_FIRST_CONSTANT..=0xFC => {
                let index = usize::from(op - DONN_BITS_FIRST_CONSTANT);
                let &word = DONN_BITS_WORDS.get(index).ok_or_else(|| {
                    DecompressError::cant(format!("invalid constant word index {index}"))
                })?;
                Token::Constant(word)
            }
            0x40 => Token::Remember(Length::EncodedWords),
            0x41..=0x47 => Token::Remember(Length::Fixed(word_length(op - 0x40))),
            0x01 => Token::Literal(Length::EncodedWords),
            0x02..=0x3F => Token::Literal(Length::Fixed(word_length(op))),
            0x00 => Token::Stop,
        })
    }
}

/// Decode a complete version 8 DonnBits resource.
pub fn decompress(input: &[u8], debug: bool) -> Result<Decoded, DecompressError> {
    dictionary::decompress::<DonnBits>(input, debug)
}
