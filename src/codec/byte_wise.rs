// Byte-wise: the byte-oriented sibling of DonnBits.
//
// Same token classes and the same variable table, but lengths count bytes
// and the reuse range is carried in the token itself.

use super::context::Decoded;
use super::dictionary;
use super::token::{Grammar, IndexSource, Length, Token};
use crate::error::DecompressError;
use crate::format::tables::{BYTE_WISE_FIRST_CONSTANT, BYTE_WISE_WORDS};

/// First token carrying a reuse index.
const FIRST_EMBEDDED_REUSE: u8 = 0x20;

pub struct ByteWise;

impl Grammar for ByteWise {
    const NAME: &'static str = "byte-wise";

    fn classify(op: u8) -> Result<Token, DecompressError> {
        Ok(match op {
            0xFF => Token::End,
            0xFE => Token::Extended,
            BYTE_WISE_FIRST_CONSTANT..=0xFD => {
                Token::Constant(BYTE_WISE_WORDS[usize::from(op - BYTE_WISE_FIRST_CONSTANT)])
            }
            0xD0 => Token::Literal(Length::EncodedBytes),
            0xD1 => Token::Remember(Length::EncodedBytes),
            0xD2 => Token::Reuse(IndexSource::Byte { bias: 0 }),
            0xD3 => Token::Reuse(IndexSource::Byte { bias: 256 }),
            0xD4 => Token::Reuse(IndexSource::Word { bias: 0 }),
            FIRST_EMBEDDED_REUSE..=0xCF => {
                Token::Reuse(IndexSource::Embedded(usize::from(op - FIRST_EMBEDDED_REUSE)))
            }
            0x10..=0x1F => Token::Remember(Length::Fixed(usize::from(op & 0x0F) + 1)),
            0x00..=0x0F => Token::Literal(Length::Fixed(usize::from(op) + 1)),
        })
    }
}

/// Decode a complete version 8 byte-wise resource.
pub fn decompress(input: &[u8], debug: bool) -> Result<Decoded, DecompressError> {
    dictionary::decompress::<ByteWise>(input, debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::header::{DCMP_BYTE_WISE, ResourceHeader};

    fn resource(actual: u32, tokens: &[u8]) -> Vec<u8> {
        let mut v = ResourceHeader::donn_bits(actual, 255, DCMP_BYTE_WISE).to_bytes();
        v.extend_from_slice(tokens);
        v
    }

    #[test]
    fn partition() {
        assert_eq!(ByteWise::classify(0xFF).unwrap(), Token::End);
        assert_eq!(ByteWise::classify(0xFE).unwrap(), Token::Extended);
        assert_eq!(ByteWise::classify(0xD5).unwrap(), Token::Constant(0x0000));
        assert_eq!(ByteWise::classify(0xFD).unwrap(), Token::Constant(0x3637));
        assert_eq!(
            ByteWise::classify(0xD0).unwrap(),
            Token::Literal(Length::EncodedBytes)
        );
        assert_eq!(
            ByteWise::classify(0xD3).unwrap(),
            Token::Reuse(IndexSource::Byte { bias: 256 })
        );
        assert_eq!(
            ByteWise::classify(0x20).unwrap(),
            Token::Reuse(IndexSource::Embedded(0))
        );
        assert_eq!(
            ByteWise::classify(0xCF).unwrap(),
            Token::Reuse(IndexSource::Embedded(175))
        );
        assert_eq!(
            ByteWise::classify(0x1F).unwrap(),
            Token::Remember(Length::Fixed(16))
        );
        assert_eq!(
            ByteWise::classify(0x00).unwrap(),
            Token::Literal(Length::Fixed(1))
        );
    }

    #[test]
    fn every_byte_classifies() {
        for op in 0..=u8::MAX {
            assert!(ByteWise::classify(op).is_ok(), "{op:#04X}");
        }
    }

    #[test]
    fn literal_remember_reuse() {
        // "ab" literal, remember "xyz", reuse it via embedded and D2 forms.
        let input = resource(11, &[0x01, b'a', b'b', 0x12, b'x', b'y', b'z', 0x20, 0xD2, 0x00]);
        let decoded = decompress(&input, false).unwrap();
        assert_eq!(decoded.data, b"abxyzxyzxyz");
        assert_eq!(decoded.stats.vars_stored, 1);
        assert_eq!(decoded.stats.vars_reused, 2);
    }

    #[test]
    fn encoded_lengths_count_bytes() {
        let input = resource(5, &[0xD0, 0x03, 1, 2, 3, 0xD6]);
        assert_eq!(decompress(&input, false).unwrap().data, [1, 2, 3, 0x00, 0x01]);
    }

    #[test]
    fn extended_word_run() {
        // FE 03: word run of 0x0102, count 1 -> two words.
        let input = resource(4, &[0xFE, 0x03, 0xC1, 0x02, 0x01]);
        assert_eq!(decompress(&input, false).unwrap().data, [0x01, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn dictionary_overflow_is_reported() {
        // Ratio 0 with 4 output bytes leaves a 2-byte arena.
        let mut input = ResourceHeader::donn_bits(4, 0, DCMP_BYTE_WISE).to_bytes();
        input.extend_from_slice(&[0x12, 1, 2, 3]);
        assert_eq!(
            decompress(&input, false),
            Err(DecompressError::DictionaryFull {
                needed: 3,
                available: 2
            })
        );
    }

    #[test]
    fn truncated_input_fails() {
        let input = resource(4, &[0x03, 1, 2]);
        assert_eq!(
            decompress(&input, false),
            Err(DecompressError::InputOutOfBounds)
        );
    }
}
