//! Error types for swcache
//!
//! All modules use `SwcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for swcache operations
pub type SwcacheResult<T> = Result<T, SwcacheError>;

/// All errors that can occur in swcache
#[derive(Error, Debug)]
pub enum SwcacheError {
    // Lifecycle errors
    #[error("Install failed: precache of {url} failed: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Invalid controller state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No active controller for {0}")]
    NoActiveController(String),

    // Fetch errors
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    // Storage errors
    #[error("Cache storage error in {partition}: {reason}")]
    Storage { partition: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Origin not configured")]
    OriginMissing,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SwcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a storage error for a partition
    pub fn storage(partition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Storage {
            partition: partition.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::InstallFailed { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } => {
                Some("The previous version still serves. Fix the precache list and rerun install")
            }
            Self::NoActiveController(_) => Some("Run: swcache install"),
            Self::OriginMissing => {
                Some("Pass --origin or run: swcache config init, then set [controller] origin")
            }
            _ => None,
        }
    }
}
