//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `GITGRAM_SOURCE_TOKEN` - Gitter API token
//! - `GITGRAM_SOURCE_ROOM_ID` - Gitter room id
//! - `GITGRAM_DEST_TOKEN` - Telegram bot token
//! - `GITGRAM_DEST_ADMINS` - Admin usernames, whitespace separated
//! - `GITGRAM_DEST_GROUP_ID` - Initially bound Telegram chat
//! - `GITGRAM_IMAGE_HOST_CLIENT_ID` - Imgur client id

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "GITGRAM";

/// Apply environment variable overrides to a config.
///
/// This allows tokens to be provided via environment variables instead
/// of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    // Gitter
    if let Ok(token) = env::var(format!("{}_SOURCE_TOKEN", ENV_PREFIX)) {
        config.source.token = token;
    }
    if let Ok(room_id) = env::var(format!("{}_SOURCE_ROOM_ID", ENV_PREFIX)) {
        config.source.room_id = room_id;
    }

    // Telegram
    if let Ok(token) = env::var(format!("{}_DEST_TOKEN", ENV_PREFIX)) {
        config.dest.token = token;
    }
    if let Ok(admins) = env::var(format!("{}_DEST_ADMINS", ENV_PREFIX)) {
        config.dest.admins = admins;
    }
    if let Ok(group_id) = env::var(format!("{}_DEST_GROUP_ID", ENV_PREFIX)) {
        if let Ok(id) = group_id.trim().parse() {
            config.dest.group_id = id;
        }
    }

    // Imgur
    if let Ok(client_id) = env::var(format!("{}_IMAGE_HOST_CLIENT_ID", ENV_PREFIX)) {
        config.dest.image_host_client_id = Some(client_id);
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `GITGRAM_CONFIG` environment variable, otherwise returns "config.json".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "config.json".to_string())
}
