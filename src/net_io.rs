pub mod packet;

use crate::error::ParseError;

/// Maximum encoded size of a 32-bit VarInt.
pub const MAX_VARINT_SIZE: usize = 5;

/// Appends `value` to `buffer` as a VarInt. Negative values are written
/// through their 32-bit two's-complement pattern, so the handshake's
/// virtual protocol version `-1` comes out as five bytes.
pub fn write_varint(value: i32, buffer: &mut Vec<u8>) {
    let mut v = value as u32;
    loop {
        let mut temp = (v & 0b0111_1111) as u8;
        v >>= 7;
        if v != 0 {
            temp |= 0b1000_0000;
        }

        buffer.push(temp);

        if v == 0 {
            break;
        }
    }
}

/// Reads a VarInt from `buffer` starting at `offset`.
///
/// Returns `Ok(Some((value, bytes_consumed)))` on success and `Ok(None)`
/// when the buffer ends before the continuation bit terminates. A value
/// that does not terminate within 5 bytes is malformed.
pub fn read_varint(buffer: &[u8], offset: usize) -> Result<Option<(i32, usize)>, ParseError> {
    let mut size = 0;
    let mut v: i32 = 0;

    loop {
        let r = match buffer.get(offset + size) {
            Some(b) => *b,
            None => {
                if size >= MAX_VARINT_SIZE {
                    return Err(ParseError::VarIntTooLong);
                }
                return Ok(None);
            }
        };

        let value = i32::from(r & 0b0111_1111);
        v |= value.overflowing_shl(7 * size as u32).0;

        size += 1;

        if size > MAX_VARINT_SIZE {
            log::error!("VarInt too long (max size: 5, read: {})", v);
            return Err(ParseError::VarIntTooLong);
        }

        if r & 0b1000_0000 == 0 {
            break;
        }
    }

    Ok(Some((v, size)))
}

/// Number of bytes `write_varint` would emit, without allocating.
pub fn varint_length(value: i32) -> usize {
    let mut v = value as u32;
    let mut size = 1;
    while v >= 0b1000_0000 {
        v >>= 7;
        size += 1;
    }
    size
}
