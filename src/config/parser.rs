//! Configuration file parsing (HOCON format, which also accepts plain JSON).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::Config;
use hocon::HoconLoader;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hocon() {
        let config = load_config_str(
            r#"
            source {
              token = "gitter-token"
              roomId = "5f1a2b"
            }
            dest {
              token = "123:abc"
              admins = "alice  bob"
              groupId = -100200300
              imageHostClientId = "imgur-id"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.source.token, "gitter-token");
        assert_eq!(config.source.room_id, "5f1a2b");
        assert_eq!(config.dest.admin_list(), vec!["alice", "bob"]);
        assert_eq!(config.dest.group_id, -100200300);
        assert_eq!(config.dest.image_host_client_id(), Some("imgur-id"));
    }

    #[test]
    fn test_parse_json() {
        let config = load_config_str(
            r#"{
              "source": { "token": "t", "roomId": "r" },
              "dest": {
                "token": "b",
                "admins": "alice",
                "groupId": "42",
                "imageHostClientId": ""
              }
            }"#,
        )
        .unwrap();

        assert_eq!(config.source.room_id, "r");
        assert_eq!(config.dest.group_id, 42);
        assert_eq!(config.dest.image_host_client_id(), None);
    }

    #[test]
    fn test_optional_fields_default() {
        let config = load_config_str(
            r#"
            source { token = "t", roomId = "r" }
            dest { token = "b", admins = "alice" }
            "#,
        )
        .unwrap();

        assert_eq!(config.dest.group_id, 0);
        assert_eq!(config.dest.initial_binding(), None);
        assert_eq!(config.dest.image_host_client_id(), None);
    }

    #[test]
    fn test_missing_required_section_fails() {
        let result = load_config_str(r#"source { token = "t", roomId = "r" }"#);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = load_config("/nonexistent/gitgram.conf");
        assert!(result.is_err());
    }
}
