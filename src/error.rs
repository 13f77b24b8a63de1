use std::{io, time::Duration};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Io(io::Error),
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
    #[error("decompression failed: {0}")]
    Decompression(#[from] DecompressionError),
    #[error("invalid status response: {0}")]
    InvalidStatus(#[from] simd_json::Error),
    #[error("server address is empty")]
    EmptyAddress,
    #[error("a probe username is required to detect online mode")]
    MissingProbeUsername,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("VarInt is longer than 5 bytes")]
    VarIntTooLong,
    #[error("negative length {0}")]
    NegativeLength(i32),
    #[error("frame of {0} bytes is larger than the protocol allows")]
    FrameTooLarge(usize),
    #[error("needed {needed} more bytes but only {remaining} remain in the packet")]
    Truncated { needed: usize, remaining: usize },
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("unexpected packet id {0:#04x}")]
    UnexpectedPacketId(i32),
    #[error("unexpected end of stream")]
    UnexpectedEof,
}

#[derive(Debug, Error)]
pub enum DecompressionError {
    #[error("packet declared {declared} bytes but inflated to {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("corrupt zlib stream: {0}")]
    Corrupt(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // a peer hanging up mid-frame is a protocol problem, not a transport one
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::Protocol(ProtocolViolation::UnexpectedEof)
        } else {
            Error::Io(err)
        }
    }
}
