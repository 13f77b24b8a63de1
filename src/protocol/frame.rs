use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tracing::trace;

use super::{
    MAX_PACKET_SIZE,
    compression::CompressionState,
    varint::{read_varint_async, varint_len, write_varint},
    wire::PacketReader,
};
use crate::error::{ProtocolViolation, Result};

/// Prefix a payload with its length.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let length = payload.len() as i32;
    let mut frame = Vec::with_capacity(varint_len(length) + payload.len());
    write_varint(&mut frame, length);
    frame.extend_from_slice(payload);
    frame
}

pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    // write_all keeps going after partial writes
    writer.write_all(&encode_frame(payload)).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a length and then exactly that many bytes.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let length = read_varint_async(reader).await?;
    if length < 0 {
        return Err(ProtocolViolation::NegativeLength(length).into());
    }
    let length = length as usize;
    if length > MAX_PACKET_SIZE {
        return Err(ProtocolViolation::FrameTooLarge(length).into());
    }

    let mut frame = vec![0; length];
    reader.read_exact(&mut frame).await?;
    Ok(frame)
}

/// A decoded packet. Only lives long enough to be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub body: Vec<u8>,
}

impl Packet {
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = PacketReader::new(payload);
        let id = reader.read_varint()?;
        Ok(Self {
            id,
            body: reader.read_rest().to_vec(),
        })
    }

    pub fn reader(&self) -> PacketReader<'_> {
        PacketReader::new(&self.body)
    }
}

/// One open connection to a server, plus the compression state it negotiated.
pub struct Connection<S = TcpStream> {
    stream: S,
    compression: CompressionState,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            compression: CompressionState::default(),
        }
    }

    pub fn set_compression_threshold(&mut self, threshold: i32) {
        self.compression.set_threshold(threshold);
    }

    /// Send a payload (packet id + body) as one frame.
    pub async fn send(&mut self, payload: Vec<u8>) -> Result<()> {
        let payload = self.compression.compress(payload)?;
        trace!("sending frame of {} bytes", payload.len());
        write_frame(&mut self.stream, &payload).await
    }

    pub async fn recv(&mut self) -> Result<Packet> {
        let frame = read_frame(&mut self.stream).await?;
        trace!("received frame of {} bytes", frame.len());
        let payload = self.compression.decompress(frame)?;
        Packet::parse(&payload)
    }

    /// Politely close the write half. Errors are ignored since the socket is
    /// dropped right after anyways.
    pub async fn shutdown(mut self) {
        let _ = self.stream.shutdown().await;
    }
}
