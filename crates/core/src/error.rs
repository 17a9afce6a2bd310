//! Configuration error model.

use thiserror::Error;

/// Result type used when loading console configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Startup configuration failure.
///
/// These are fatal at boot. Per-navigation authorization failures are never
/// errors; they are modeled as redirects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was empty or whitespace only.
    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    /// A value was present but malformed.
    #[error("{key} is malformed: {reason}")]
    Malformed { key: &'static str, reason: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl ConfigError {
    pub fn empty(key: &'static str) -> Self {
        Self::Empty { key }
    }

    pub fn malformed(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            key,
            reason: reason.into(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
