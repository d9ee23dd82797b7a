//! Domain error types

use thiserror::Error;

/// Error when converting audio between its binary and text-safe forms
#[derive(Debug, Clone, Error)]
pub enum EncodingError {
    #[error("audio payload is empty")]
    EmptyAudio,

    #[error("malformed audio text encoding: {0}")]
    Malformed(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
