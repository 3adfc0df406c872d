//! Error taxonomy of the refresh helper.
//!
//! Configuration problems surface once, at initialization. Every failure on the
//! fetch path is typed and returned to the caller; nothing is retried here.
//! Malformed token claims are not errors at all (see [`crate::freshness`]).

use thiserror::Error;

/// Raised while decoding or validating the plugin configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Raised by a refresh that had to go to the token provider.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// Network, TLS or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The provider answered with something that is not a token response.
    #[error("cannot decode provider response (status {status}): {message}")]
    Decode { status: u16, message: String },

    /// The provider explicitly rejected the request.
    #[error("{code}: {description}")]
    Provider { code: String, description: String },

    /// The configured method/URL cannot form a valid request.
    #[error("cannot build token request: {0}")]
    Config(String),

    /// The caller cancelled or the deadline passed before the exchange finished.
    #[error("token request cancelled")]
    Cancelled,
}

impl RefreshError {
    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            RefreshError::Transport(_) => "transport",
            RefreshError::Decode { .. } => "decode",
            RefreshError::Provider { .. } => "provider",
            RefreshError::Config(_) => "config",
            RefreshError::Cancelled => "cancelled",
        }
    }
}
