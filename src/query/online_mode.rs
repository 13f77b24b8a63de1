//! Finds out whether a server is in online mode by starting a login and
//! looking at the first thing it sends back.

use std::fmt::{self, Display};

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::{
    error::Result,
    protocol::{
        Connection,
        packets::{self, LoginPacket, NextState},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineMode {
    Online,
    Offline,
    /// We couldn't tell. This is a normal result, not an error.
    Unknown,
}

impl Display for OnlineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnlineMode::Online => "online",
            OnlineMode::Offline => "offline",
            OnlineMode::Unknown => "unknown",
        })
    }
}

// These only match vanilla's untranslated messages, so servers with custom or
// localized kick messages end up classified as online.
const UNVERIFIED_USERNAME_MARKER: &str = "multiplayer.disconnect.unverified_username";
const DOUBLE_LOGIN_MARKER: &str = "Double login";

/// Guess the online mode from a login disconnect reason.
pub fn classify_disconnect(reason: &str) -> OnlineMode {
    if reason.contains(UNVERIFIED_USERNAME_MARKER) {
        OnlineMode::Offline
    } else if reason.contains(DOUBLE_LOGIN_MARKER) {
        OnlineMode::Unknown
    } else {
        OnlineMode::Online
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeState {
    Connecting,
    AwaitingLoginPacket,
    Done(OnlineMode),
}

/// What to do after a login packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Reply(Vec<u8>),
    EnableCompression(i32),
    Done(OnlineMode),
}

pub struct LoginProbe<'a> {
    username: &'a str,
    protocol_version: i32,
    state: ProbeState,
}

impl<'a> LoginProbe<'a> {
    pub fn new(username: &'a str, protocol_version: i32) -> Self {
        Self {
            username,
            protocol_version,
            state: ProbeState::Connecting,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// Feed one login packet. Once the mode is known, later packets are
    /// ignored and the same result is returned again.
    pub fn handle(&mut self, packet: LoginPacket) -> Action {
        if let ProbeState::Done(mode) = self.state {
            trace!("already finished, ignoring {packet:?}");
            return Action::Done(mode);
        }

        let action = match packet {
            LoginPacket::Disconnect { reason } => {
                debug!("disconnected during login: {reason}");
                Action::Done(classify_disconnect(&reason))
            }
            LoginPacket::EncryptionRequest => Action::Done(OnlineMode::Online),
            LoginPacket::LoginSuccess => Action::Done(OnlineMode::Offline),
            LoginPacket::SetCompression { threshold } => Action::EnableCompression(threshold),
            LoginPacket::LoginPluginRequest {
                message_id,
                channel,
            } => {
                debug!("declining login plugin request {message_id} on {channel}");
                Action::Reply(packets::login_plugin_response(message_id, false))
            }
            LoginPacket::CookieRequest { key } => {
                debug!("no cookie to give for {key}");
                Action::Reply(packets::cookie_response(&key, false))
            }
        };
        self.state = match action {
            Action::Done(mode) => ProbeState::Done(mode),
            _ => ProbeState::AwaitingLoginPacket,
        };
        action
    }

    /// Send the handshake and Login Start, then read packets until one of
    /// them tells us the online mode. Any error ends the attempt.
    pub async fn run<S: AsyncRead + AsyncWrite + Unpin>(
        mut self,
        conn: &mut Connection<S>,
        hostname: &str,
        port: u16,
    ) -> Result<OnlineMode> {
        conn.send(packets::handshake(
            self.protocol_version,
            hostname,
            port,
            NextState::Login,
        ))
        .await?;
        conn.send(packets::login_start(self.username, self.protocol_version))
            .await?;
        self.state = ProbeState::AwaitingLoginPacket;

        loop {
            let packet = conn.recv().await?;
            let packet = LoginPacket::parse(&packet)?;
            trace!("login packet: {packet:?}");

            match self.handle(packet) {
                Action::Reply(reply) => conn.send(reply).await?,
                Action::EnableCompression(threshold) => conn.set_compression_threshold(threshold),
                Action::Done(mode) => return Ok(mode),
            }
        }
    }
}
