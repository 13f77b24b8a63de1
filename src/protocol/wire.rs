//! Typed reads and writes for packet payloads.

use super::varint::{read_varint, write_varint};
use crate::error::{ProtocolViolation, Result};

/// Builds a packet payload (id included) one field at a time.
#[derive(Default, Clone, Debug)]
pub struct PacketWriter {
    buffer: Vec<u8>,
}

impl PacketWriter {
    /// Start a packet. The id is always the first VarInt of the payload.
    pub fn new(packet_id: i32) -> Self {
        let mut writer = Self::default();
        writer.write_varint(packet_id);
        writer
    }

    pub fn write_varint(&mut self, value: i32) -> &mut Self {
        write_varint(&mut self.buffer, value);
        self
    }

    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write_varint(value.len() as i32);
        self.buffer.extend_from_slice(value.as_bytes());
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buffer.push(value as u8);
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

/// Reads fields out of a payload that's already fully in memory.
pub struct PacketReader<'a> {
    buffer: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }

    pub fn read_varint(&mut self) -> Result<i32> {
        read_varint(&mut self.buffer)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.buffer.len() {
            return Err(ProtocolViolation::Truncated {
                needed: len,
                remaining: self.buffer.len(),
            }
            .into());
        }
        let (bytes, rest) = self.buffer.split_at(len);
        self.buffer = rest;
        Ok(bytes)
    }

    /// Everything that hasn't been read yet.
    pub fn read_rest(&mut self) -> &'a [u8] {
        std::mem::take(&mut self.buffer)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_varint()?;
        if len < 0 {
            return Err(ProtocolViolation::NegativeLength(len).into());
        }
        let bytes = self.read_bytes(len as usize)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolViolation::InvalidUtf8.into())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let mut bytes = [0; 8];
        bytes.copy_from_slice(self.read_bytes(8)?);
        Ok(i64::from_be_bytes(bytes))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_bytes(1)?[0] != 0)
    }
}
