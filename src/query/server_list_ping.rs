use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::{
    error::{ProtocolViolation, Result},
    protocol::{
        Connection,
        packets::{self, LATEST_PROTOCOL_VERSION, NextState},
    },
    status::StatusResponse,
};

/// Handshake into the status state, ask for the status and read the one
/// response.
pub async fn ping<S: AsyncRead + AsyncWrite + Unpin>(
    conn: &mut Connection<S>,
    hostname: &str,
    port: u16,
) -> Result<StatusResponse> {
    conn.send(packets::handshake(
        LATEST_PROTOCOL_VERSION,
        hostname,
        port,
        NextState::Status,
    ))
    .await?;
    conn.send(packets::status_request()).await?;

    let packet = conn.recv().await?;
    if packet.id != 0x00 {
        return Err(ProtocolViolation::UnexpectedPacketId(packet.id).into());
    }
    let status_json = packet.reader().read_string()?;
    debug!("status response from {hostname}:{port}: {status_json}");

    StatusResponse::parse(&status_json)
}

#[cfg(test)]
mod tests {
    use tokio::io::duplex;

    use super::*;
    use crate::{error::Error, protocol::wire::PacketWriter};

    #[tokio::test]
    async fn test_ping_over_duplex() {
        let (client, server) = duplex(4096);
        let mut client = Connection::new(client);
        let mut server = Connection::new(server);

        let server_task = tokio::spawn(async move {
            let handshake = server.recv().await.unwrap();
            let mut reader = handshake.reader();
            assert_eq!(reader.read_varint().unwrap(), -1);
            assert_eq!(reader.read_string().unwrap(), "mc.example.com");
            assert_eq!(reader.read_u16().unwrap(), 25565);
            assert_eq!(reader.read_varint().unwrap(), 1);

            let request = server.recv().await.unwrap();
            assert_eq!(request.id, 0x00);
            assert!(request.body.is_empty());

            let mut response = PacketWriter::new(0x00);
            response.write_string(
                r#"{"version":{"name":"1.8.9","protocol":47},"players":{"max":1,"online":1,"sample":[{"name":"Notch","id":"069a79f4-44e9-4726-a5be-fca90e38aaf5"}]},"description":{"text":"hi"}}"#,
            );
            server.send(response.into_inner()).await.unwrap();
        });

        let status = ping(&mut client, "mc.example.com", 25565).await.unwrap();
        server_task.await.unwrap();

        assert_eq!(status.version.protocol, 47);
        let sample = status.players.sample.unwrap();
        assert_eq!(sample[0].name, "Notch");
    }

    #[tokio::test]
    async fn test_unexpected_packet_id() {
        let (client, server) = duplex(4096);
        let mut client = Connection::new(client);
        let mut server = Connection::new(server);

        tokio::spawn(async move {
            server.recv().await.unwrap();
            server.recv().await.unwrap();
            server.send(vec![0x01, 0x00]).await.unwrap();
        });

        assert!(matches!(
            ping(&mut client, "localhost", 25565).await,
            Err(Error::Protocol(ProtocolViolation::UnexpectedPacketId(0x01)))
        ));
    }
}
