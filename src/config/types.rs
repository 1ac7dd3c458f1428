//! Configuration type definitions.

use serde::{Deserialize, Deserializer};

use crate::common::DestinationId;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub dest: DestConfig,
}

/// Gitter (source side) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub token: String,
    pub room_id: String,
}

/// Telegram (destination side) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestConfig {
    pub token: String,
    /// Whitespace separated usernames allowed to run admin commands.
    pub admins: String,
    /// Initially bound chat, 0 = unbound.
    #[serde(default, deserialize_with = "deserialize_group_id")]
    pub group_id: i64,
    #[serde(default)]
    pub image_host_client_id: Option<String>,
}

impl DestConfig {
    /// Admin usernames as a list.
    pub fn admin_list(&self) -> Vec<String> {
        self.admins.split_whitespace().map(str::to_string).collect()
    }

    pub fn initial_binding(&self) -> Option<DestinationId> {
        DestinationId::from_config(self.group_id)
    }

    /// Imgur client id, if rehosting is enabled.
    pub fn image_host_client_id(&self) -> Option<&str> {
        self.image_host_client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Accept `groupId` as either an integer or a numeric string.
fn deserialize_group_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawGroupId {
        Number(i64),
        Text(String),
    }

    match RawGroupId::deserialize(deserializer)? {
        RawGroupId::Number(id) => Ok(id),
        RawGroupId::Text(text) if text.trim().is_empty() => Ok(0),
        RawGroupId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid groupId '{}'", text))),
    }
}
