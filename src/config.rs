use std::time::Duration;

use serde::Deserialize;

/// Where to find a server and how long to give it.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// The deadline for a whole query, from connecting until the last packet
    /// is read. Defaults to 5 seconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// The username sent in Login Start when detecting online mode. Not needed
    /// for anything else.
    #[serde(default)]
    pub probe_username: Option<String>,

    /// The protocol version to log in with when detecting online mode. If this
    /// isn't set, the version the server reports in its status is used.
    #[serde(default)]
    pub protocol_version: Option<i32>,
}

fn default_address() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    25565
}
fn default_timeout_ms() -> u64 {
    5000
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            probe_username: None,
            protocol_version: None,
        }
    }
}

impl QueryConfig {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// The config file for the command line tool.
#[derive(Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// If set, debug logs are also written to a daily log file in this
    /// directory.
    #[serde(default)]
    pub logging_dir: Option<String>,

    /// Whether to try logging in to find out if servers are in online mode.
    /// Only targets with a `probe_username` are checked.
    #[serde(default)]
    pub check_online_mode: bool,

    pub targets: Vec<QueryConfig>,
}
