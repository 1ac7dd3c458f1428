//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate Gitter config
    check_token(&mut errors, "source.token", &config.source.token);
    if config.source.room_id.trim().is_empty() {
        errors.push("source.roomId is required".to_string());
    }

    // Validate Telegram config
    check_token(&mut errors, "dest.token", &config.dest.token);
    if config.dest.admin_list().is_empty() {
        errors.push("dest.admins must name at least one username".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn check_token(errors: &mut Vec<String>, field: &str, token: &str) {
    let token = token.trim();
    if token.is_empty() {
        errors.push(format!("{} is required", field));
    } else if token.starts_with("YOUR_") && token.ends_with("_HERE") {
        errors.push(format!(
            "{} has not been configured (still using placeholder)",
            field
        ));
    }
}
