// Unsigned LEB128 variable-length integers.
//
// Seven payload bits per byte, least significant group first, high bit set
// on every byte except the last.

use crate::FstError;

/// Longest encoding of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

/// Append `value` to `out`.
pub fn write_u32(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes [`write_u32`] emits for `value`.
pub fn encoded_len(value: u32) -> usize {
    match value {
        0..0x80 => 1,
        0x80..0x4000 => 2,
        0x4000..0x20_0000 => 3,
        0x20_0000..0x1000_0000 => 4,
        _ => 5,
    }
}

/// Decode one value starting at `*pos`, advancing `*pos` past it.
///
/// Fails on truncated input and on encodings that do not fit in 32 bits.
pub fn read_u32(data: &[u8], pos: &mut usize) -> Result<u32, FstError> {
    let mut result: u32 = 0;
    let mut shift = 0;
    loop {
        let Some(&byte) = data.get(*pos) else {
            return Err(FstError::TooShort {
                expected: *pos + 1,
                actual: data.len(),
            });
        };
        *pos += 1;
        if shift == 28 && byte & 0xF0 != 0 {
            return Err(FstError::Corrupt("varint does not fit in 32 bits".to_string()));
        }
        result |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}
