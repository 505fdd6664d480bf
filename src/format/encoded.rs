// Self-describing variable-width integers used by the token grammars.
//
//   0x00..=0x7F  one byte, the value itself
//   0xFF         marker, followed by a 4-byte big-endian value
//   other        two bytes forming a signed 15-bit value:
//                ((b0 - 0xC0) << 9 | b1 << 1) as i16 >> 1

use crate::error::DecompressError;

/// Values below this fit in one byte.
pub const TWO_BYTE_VALUE: u8 = 128;
/// Leading byte introducing a 32-bit value.
pub const FOUR_BYTE_VALUE: u8 = 255;

/// Decode one Encoded Value from the front of `data`.
/// Returns `(value, bytes_consumed)`.
#[inline]
pub fn read_encoded(data: &[u8]) -> Result<(i32, usize), DecompressError> {
    let &first = data.first().ok_or(DecompressError::InputOutOfBounds)?;

    if first < TWO_BYTE_VALUE {
        return Ok((i32::from(first), 1));
    }

    if first == FOUR_BYTE_VALUE {
        let b = data.get(1..5).ok_or(DecompressError::InputOutOfBounds)?;
        let value = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        return Ok((value as i32, 5));
    }

    let &second = data.get(1).ok_or(DecompressError::InputOutOfBounds)?;
    let wide = ((i32::from(first) - 0xC0) << 9) | (i32::from(second) << 1);
    // Truncate to 16 bits, then shift right arithmetically to sign-extend.
    let value = (wide as i16) >> 1;
    Ok((i32::from(value), 2))
}
