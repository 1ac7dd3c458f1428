//! Error types for the application.

use thiserror::Error;

use crate::common::types::Platform;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{platform} authentication failed: {source}")]
    Authentication {
        platform: Platform,
        #[source]
        source: PlatformError,
    },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors raised by the Gitter and Telegram adapters.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

/// Errors while moving a Telegram attachment to the image host.
#[derive(Debug, Error)]
pub enum RehostError {
    #[error("Could not resolve file URL: {0}")]
    Resolve(#[source] PlatformError),

    #[error("Image host request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Image host returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Image host rejected the upload (status {status})")]
    Rejected { status: i64 },

    #[error("Malformed image host response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Image host response carries no link")]
    MissingLink,
}

/// Result type alias for adapter operations.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;
