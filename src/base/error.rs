//! Typed errors for the three failure domains of a bot.

use std::time::Duration;

use thiserror::Error;

/// Startup configuration is missing or invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("required configuration value `{0}` is missing or empty")]
    Missing(&'static str),

    #[error("invalid configuration value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// The chat platform rejected a call.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to post message to channel `{channel_id}`: {message}")]
    PostMessage { channel_id: String, message: String },

    #[error("failed to verify bot identity: {0}")]
    Auth(String),
}

/// The remote generation call failed.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inference endpoint rejected credentials ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("inference endpoint returned an error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("unexpected inference response: {0}")]
    Malformed(String),

    #[error("inference request timed out after {0:?}")]
    Timeout(Duration),
}
