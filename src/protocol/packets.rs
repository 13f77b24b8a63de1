//! The handful of packets needed for status and login probing.
//!
//! https://minecraft.wiki/w/Java_Edition_protocol

use md5::{Digest, Md5};
use uuid::Uuid;

use super::{frame::Packet, wire::PacketWriter};
use crate::error::{ProtocolViolation, Result};

/// Sent as the protocol version when we don't know what the server speaks.
/// Servers reply to status requests regardless of the version.
pub const LATEST_PROTOCOL_VERSION: i32 = -1;

/// Protocol version 761 (1.19.3) is the first to send a UUID in Login Start.
pub const LOGIN_START_UUID_PROTOCOL_VERSION: i32 = 761;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum NextState {
    Status = 1,
    Login = 2,
}

pub fn handshake(protocol_version: i32, hostname: &str, port: u16, next_state: NextState) -> Vec<u8> {
    let mut writer = PacketWriter::new(0x00);
    // Some server implementations require hostname and port to be properly set (Notchian does not)
    writer
        .write_varint(protocol_version)
        .write_string(hostname)
        .write_u16(port)
        .write_varint(next_state as i32);
    writer.into_inner()
}

pub fn status_request() -> Vec<u8> {
    PacketWriter::new(0x00).into_inner()
}

pub fn login_start(username: &str, protocol_version: i32) -> Vec<u8> {
    let mut writer = PacketWriter::new(0x00);
    writer.write_string(username);
    if protocol_version >= LOGIN_START_UUID_PROTOCOL_VERSION {
        let (most_significant, least_significant) = offline_uuid(username).as_u64_pair();
        writer
            .write_i64(most_significant as i64)
            .write_i64(least_significant as i64);
    }
    writer.into_inner()
}

pub fn login_plugin_response(message_id: i32, understood: bool) -> Vec<u8> {
    let mut writer = PacketWriter::new(0x02);
    writer.write_varint(message_id).write_bool(understood);
    writer.into_inner()
}

pub fn cookie_response(key: &str, has_payload: bool) -> Vec<u8> {
    let mut writer = PacketWriter::new(0x04);
    writer.write_string(key).write_bool(has_payload);
    writer.into_inner()
}

/// The UUID an offline-mode server gives a player: a version 3 UUID made from
/// the MD5 of `OfflinePlayer:<username>`, without a namespace.
pub fn offline_uuid(username: &str) -> Uuid {
    let digest = Md5::digest(format!("OfflinePlayer:{username}").as_bytes());
    let mut hash = [0; 16];
    hash.copy_from_slice(&digest);
    uuid::Builder::from_md5_bytes(hash).into_uuid()
}

/// Everything the server can send us during the login phase that we know how
/// to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginPacket {
    Disconnect { reason: String },
    EncryptionRequest,
    LoginSuccess,
    SetCompression { threshold: i32 },
    LoginPluginRequest { message_id: i32, channel: String },
    CookieRequest { key: String },
}

impl LoginPacket {
    pub fn parse(packet: &Packet) -> Result<Self> {
        let mut reader = packet.reader();
        Ok(match packet.id {
            0x00 => LoginPacket::Disconnect {
                reason: reader.read_string()?,
            },
            // the contents don't matter, the server wants encryption and that's
            // all we need to know
            0x01 => LoginPacket::EncryptionRequest,
            0x02 => LoginPacket::LoginSuccess,
            0x03 => LoginPacket::SetCompression {
                threshold: reader.read_varint()?,
            },
            0x04 => {
                let message_id = reader.read_varint()?;
                let channel = reader.read_string()?;
                // the plugin data is whatever's left, we never understand it
                reader.read_rest();
                LoginPacket::LoginPluginRequest {
                    message_id,
                    channel,
                }
            }
            0x05 => LoginPacket::CookieRequest {
                key: reader.read_string()?,
            },
            id => return Err(ProtocolViolation::UnexpectedPacketId(id).into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_offline_uuid() {
        // matches what vanilla and Bukkit give offline players
        assert_eq!(
            offline_uuid("Notch").to_string(),
            "b50ad385-829d-3141-a216-7e7d7539ba7f"
        );
        assert_eq!(offline_uuid("Notch").get_version_num(), 3);
    }

    #[test]
    fn test_status_handshake() {
        let packet = handshake(LATEST_PROTOCOL_VERSION, "localhost", 25565, NextState::Status);
        let mut expected = vec![0x00, 0xff, 0xff, 0xff, 0xff, 0x0f, 0x09];
        expected.extend_from_slice(b"localhost");
        expected.extend_from_slice(&[0x63, 0xdd, 0x01]);
        assert_eq!(packet, expected);
        assert_eq!(status_request(), vec![0x00]);
    }

    #[test]
    fn test_login_start_without_uuid() {
        let packet = login_start("Bot_1", 760);
        assert_eq!(packet, b"\x00\x05Bot_1".to_vec());
    }

    #[test]
    fn test_login_start_with_uuid() {
        let packet = login_start("Bot_1", 769);
        assert_eq!(packet.len(), 1 + 1 + 5 + 16);
        assert_eq!(&packet[7..], offline_uuid("Bot_1").as_bytes());
    }

    #[test]
    fn test_replies() {
        assert_eq!(login_plugin_response(7, false), vec![0x02, 0x07, 0x00]);
        assert_eq!(
            cookie_response("a:b", false),
            vec![0x04, 0x03, b'a', b':', b'b', 0x00]
        );
    }

    #[test]
    fn test_parse_login_packets() {
        let mut plugin_body = PacketWriter::new(0x04);
        plugin_body
            .write_varint(3)
            .write_string("velocity:player_info")
            .write_bool(true);
        let plugin_payload = plugin_body.into_inner();
        assert_eq!(
            LoginPacket::parse(&Packet::parse(&plugin_payload).unwrap()).unwrap(),
            LoginPacket::LoginPluginRequest {
                message_id: 3,
                channel: "velocity:player_info".to_string(),
            }
        );

        let compression = Packet {
            id: 0x03,
            body: vec![0x80, 0x02],
        };
        assert_eq!(
            LoginPacket::parse(&compression).unwrap(),
            LoginPacket::SetCompression { threshold: 256 }
        );

        let unknown = Packet {
            id: 0x2a,
            body: vec![],
        };
        assert!(matches!(
            LoginPacket::parse(&unknown),
            Err(Error::Protocol(ProtocolViolation::UnexpectedPacketId(0x2a)))
        ));
    }
}
