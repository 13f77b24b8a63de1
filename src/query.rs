mod online_mode;
mod server_list_ping;

use std::future::Future;

use tokio::net::TcpStream;
use tracing::{debug, warn};

pub use online_mode::{Action, LoginProbe, OnlineMode, ProbeState, classify_disconnect};

use crate::{
    config::QueryConfig,
    error::{Error, Result},
    protocol::Connection,
    status::StatusResponse,
};

/// Queries one server. Every method opens its own connection and closes it
/// before returning, so a `ServerQuery` can be shared between tasks freely.
///
/// Nothing is retried. Each call is bounded by the configured timeout from
/// connecting until the last packet.
#[derive(Clone, Debug)]
pub struct ServerQuery {
    config: QueryConfig,
}

impl ServerQuery {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn display_address(&self) -> String {
        format!("{}:{}", self.config.address, self.config.port)
    }

    /// Whether a TCP connection can be opened at all. Doesn't speak the
    /// Minecraft protocol.
    pub async fn is_reachable(&self) -> bool {
        if self.config.address.is_empty() {
            return false;
        }
        match self.with_deadline(self.connect()).await {
            Ok(_conn) => true,
            Err(err) => {
                debug!("{} is unreachable: {err}", self.display_address());
                false
            }
        }
    }

    /// Do a server list ping.
    pub async fn status(&self) -> Result<StatusResponse> {
        self.check_address()?;
        self.with_deadline(self.fetch_status()).await
    }

    /// Start logging in to find out whether the server is in online mode.
    ///
    /// The login uses the protocol version from the config, or from `status`
    /// if that's not set. If neither is available the server is pinged first
    /// (within the same deadline).
    ///
    /// Failures while talking to the server result in
    /// [`OnlineMode::Unknown`]. This only returns an error if the config
    /// doesn't allow probing in the first place.
    pub async fn is_encrypted(&self, status: Option<&StatusResponse>) -> Result<OnlineMode> {
        self.check_address()?;
        let username = self
            .config
            .probe_username
            .as_deref()
            .ok_or(Error::MissingProbeUsername)?;

        let login = async {
            let protocol_version = match (self.config.protocol_version, status) {
                (Some(protocol_version), _) => protocol_version,
                (None, Some(status)) => status.version.protocol,
                (None, None) => self.fetch_status().await?.version.protocol,
            };

            let mut conn = self.connect().await?;
            let mode = LoginProbe::new(username, protocol_version)
                .run(&mut conn, &self.config.address, self.config.port)
                .await;
            conn.shutdown().await;
            mode
        };

        match self.with_deadline(login).await {
            Ok(mode) => {
                debug!("{} is in {mode} mode", self.display_address());
                Ok(mode)
            }
            Err(err) => {
                warn!(
                    "couldn't detect online mode for {}: {err}",
                    self.display_address()
                );
                Ok(OnlineMode::Unknown)
            }
        }
    }

    async fn fetch_status(&self) -> Result<StatusResponse> {
        let mut conn = self.connect().await?;
        let status = server_list_ping::ping(&mut conn, &self.config.address, self.config.port).await;
        conn.shutdown().await;
        status
    }

    async fn connect(&self) -> Result<Connection> {
        let stream = TcpStream::connect((self.config.address.as_str(), self.config.port))
            .await
            .map_err(|source| Error::Connect {
                address: self.display_address(),
                source,
            })?;
        // our packets are tiny, don't let them sit in a buffer
        stream.set_nodelay(true)?;
        Ok(Connection::new(stream))
    }

    /// Run a whole query under one timeout. The socket is dropped (and so
    /// closed) along with the future if it expires.
    async fn with_deadline<T>(&self, query: impl Future<Output = Result<T>>) -> Result<T> {
        let timeout = self.config.timeout();
        tokio::time::timeout(timeout, query)
            .await
            .map_err(|_| Error::Timeout(timeout))?
    }

    fn check_address(&self) -> Result<()> {
        if self.config.address.is_empty() {
            return Err(Error::EmptyAddress);
        }
        Ok(())
    }
}
