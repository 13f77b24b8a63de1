use std::io::{Read, Write};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use tracing::debug;

use super::{
    MAX_PACKET_SIZE,
    varint::{varint_len, write_varint},
    wire::PacketReader,
};
use crate::error::{DecompressionError, ProtocolViolation, Result};

/// The compression threshold of one connection. Starts disabled and, once a
/// Set Compression packet turns it on, stays on for the rest of the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionState {
    threshold: i32,
}

impl Default for CompressionState {
    fn default() -> Self {
        Self {
            threshold: Self::DISABLED,
        }
    }
}

impl CompressionState {
    pub const DISABLED: i32 = -1;

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold >= 0
    }

    pub fn set_threshold(&mut self, threshold: i32) {
        if threshold < 0 {
            if self.is_enabled() {
                debug!("ignoring attempt to disable compression (threshold {threshold})");
            }
            return;
        }
        debug!("compression enabled with threshold {threshold}");
        self.threshold = threshold;
    }

    /// Turn the contents of an inbound frame into the packet payload.
    pub fn decompress(&self, frame: Vec<u8>) -> Result<Vec<u8>> {
        if !self.is_enabled() {
            return Ok(frame);
        }
        decompress_frame(&frame)
    }

    /// Wrap an outbound payload in the compressed-frame format if compression
    /// is on.
    pub fn compress(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        if !self.is_enabled() {
            return Ok(payload);
        }
        compress_frame(&payload, self.threshold as usize)
    }
}

pub fn decompress_frame(frame: &[u8]) -> Result<Vec<u8>> {
    let mut reader = PacketReader::new(frame);
    let data_length = reader.read_varint()?;
    if data_length < 0 {
        return Err(ProtocolViolation::NegativeLength(data_length).into());
    }
    let body = reader.read_rest();
    if data_length == 0 {
        return Ok(body.to_vec());
    }

    let declared = data_length as usize;
    if declared > MAX_PACKET_SIZE {
        return Err(ProtocolViolation::FrameTooLarge(declared).into());
    }

    let mut decompressed = Vec::with_capacity(declared);
    // one extra byte is enough to tell that the stream is longer than declared
    ZlibDecoder::new(body)
        .take(declared as u64 + 1)
        .read_to_end(&mut decompressed)
        .map_err(DecompressionError::Corrupt)?;

    if decompressed.len() != declared {
        return Err(DecompressionError::LengthMismatch {
            declared,
            actual: decompressed.len(),
        }
        .into());
    }
    Ok(decompressed)
}

pub fn compress_frame(payload: &[u8], threshold: usize) -> Result<Vec<u8>> {
    let data_length = payload.len() as i32;
    let mut frame = Vec::with_capacity(varint_len(data_length) + payload.len());
    if payload.len() < threshold {
        write_varint(&mut frame, 0);
        frame.extend_from_slice(payload);
        return Ok(frame);
    }

    write_varint(&mut frame, data_length);
    let mut encoder = ZlibEncoder::new(frame, Compression::default());
    encoder.write_all(payload)?;
    Ok(encoder.finish()?)
}
