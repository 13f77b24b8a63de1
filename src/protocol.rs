pub mod compression;
pub mod frame;
pub mod packets;
pub mod varint;
pub mod wire;

pub use compression::CompressionState;
pub use frame::{Connection, Packet};

/// The biggest packet the protocol allows (the largest 3-byte VarInt).
pub const MAX_PACKET_SIZE: usize = 2_097_151;
