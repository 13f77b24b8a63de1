use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use uuid::Uuid;

use crate::{error::Result, query::OnlineMode};

/// What a server says about itself in the server list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub version: Version,
    /// Some proxies and plugins hide the player counts entirely.
    #[serde(default)]
    pub players: Players,
    /// Either a plain string or a rich-text component depending on the server
    /// version. We don't interpret it, see [`Self::description_plaintext`].
    #[serde(default)]
    pub description: serde_json::Value,
    /// Usually a `data:image/png;base64,` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub name: String,
    pub protocol: i32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Players {
    pub max: i32,
    pub online: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Vec<SamplePlayer>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SamplePlayer {
    pub name: String,
    pub id: String,
}

impl SamplePlayer {
    pub fn uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.id).ok()
    }
}

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

impl StatusResponse {
    pub fn parse(json: &str) -> Result<Self> {
        // simd-json parses in place
        let mut bytes = json.as_bytes().to_vec();
        Ok(simd_json::serde::from_slice(&mut bytes)?)
    }

    /// The description with all formatting stripped, or an empty string if
    /// it's not valid text.
    pub fn description_plaintext(&self) -> String {
        azalea_chat::FormattedText::deserialize(&self.description)
            .unwrap_or_default()
            .to_string()
    }

    /// The raw PNG bytes of the favicon.
    pub fn favicon_png(&self) -> Option<Vec<u8>> {
        let encoded = self.favicon.as_ref()?.strip_prefix(PNG_DATA_URI_PREFIX)?;
        // some old servers wrap the base64 in newlines
        let encoded = encoded
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect::<String>();
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .ok()
    }

    pub fn favicon_hash(&self) -> Option<[u8; 16]> {
        let favicon = self.favicon.as_ref()?;
        let mut hasher = sha2::Sha256::new();
        hasher.update(favicon.as_bytes());
        let result = hasher.finalize();
        let mut hash = [0; 16];
        hash.copy_from_slice(&result[..16]);
        Some(hash)
    }

    /// Guess whether the server is in online mode from the UUIDs in the player
    /// sample. Online players get random (v4) UUIDs from Mojang while offline
    /// players get name-based (v3) ones.
    ///
    /// This is only a hint, proxies and plugins are free to send whatever they
    /// want here.
    pub fn sample_online_mode_hint(&self) -> OnlineMode {
        let mut hint = OnlineMode::Unknown;
        for uuid in self.players.sample.iter().flatten().filter_map(|p| p.uuid()) {
            match uuid.get_version_num() {
                4 => return OnlineMode::Online,
                3 => hint = OnlineMode::Offline,
                // anonymous players have nil uuids and don't tell us anything
                _ => {}
            }
        }
        hint
    }
}
