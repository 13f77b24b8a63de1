use std::io::Read;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProtocolViolation, Result};

/// A 32-bit VarInt never needs more than this many bytes.
pub const MAX_VARINT_LEN: usize = 5;

const SEGMENT_BITS: u8 = 0b0111_1111;
const CONTINUE_BIT: u8 = 0b1000_0000;

pub fn write_varint(writer: &mut Vec<u8>, value: i32) {
    // negative numbers are sent as their two's complement, so they always take 5
    // bytes
    let mut value = value as u32;
    loop {
        let byte = (value as u8) & SEGMENT_BITS;
        value >>= 7;
        if value == 0 {
            writer.push(byte);
            return;
        }
        writer.push(byte | CONTINUE_BIT);
    }
}

pub fn encode_varint(value: i32) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(MAX_VARINT_LEN);
    write_varint(&mut buffer, value);
    buffer
}

/// The number of bytes `value` takes up when encoded.
pub fn varint_len(value: i32) -> usize {
    let bits = 32 - (value as u32).leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

pub fn read_varint(reader: &mut impl Read) -> Result<i32> {
    let mut buffer = [0];
    let mut ans = 0u32;
    for i in 0..MAX_VARINT_LEN {
        reader.read_exact(&mut buffer)?;
        ans |= ((buffer[0] & SEGMENT_BITS) as u32) << (7 * i);
        if buffer[0] & CONTINUE_BIT == 0 {
            return Ok(ans as i32);
        }
    }
    Err(ProtocolViolation::VarIntTooLong.into())
}

/// Same as [`read_varint`] but pulls one byte at a time off an async stream.
pub async fn read_varint_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32> {
    let mut ans = 0u32;
    for i in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8().await?;
        ans |= ((byte & SEGMENT_BITS) as u32) << (7 * i);
        if byte & CONTINUE_BIT == 0 {
            return Ok(ans as i32);
        }
    }
    Err(ProtocolViolation::VarIntTooLong.into())
}
