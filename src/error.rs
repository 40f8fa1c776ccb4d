//! Error types for mobility-cache
//!
//! All modules use `CacheResult<T>` as their return type. Cache misses and
//! corrupt fingerprint records are not errors; see [`crate::cache::RecordState`].

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by an asset collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for mobility-cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in mobility-cache
#[derive(Error, Debug)]
pub enum CacheError {
    // Engine errors
    #[error("Invalid input description: {reason}")]
    Configuration { reason: String },

    #[error("Failed to create asset for node {node} (fingerprint {fingerprint}): {source}")]
    Creation {
        node: String,
        fingerprint: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to read cached asset for node {node} (fingerprint {fingerprint}): {source}")]
    CachedRead {
        node: String,
        fingerprint: String,
        #[source]
        source: BoxError,
    },

    // Configuration file errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

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

    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a creation failure for a node
    pub fn creation(
        node: impl Into<String>,
        fingerprint: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Creation {
            node: node.into(),
            fingerprint: fingerprint.into(),
            source: source.into(),
        }
    }

    /// Create a cached-read failure for a node
    pub fn cached_read(
        node: impl Into<String>,
        fingerprint: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::CachedRead {
            node: node.into(),
            fingerprint: fingerprint.into(),
            source: source.into(),
        }
    }

    /// Whether the error comes from the caller's input description or
    /// location rather than from I/O or a collaborator
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Configuration { .. } => {
                Some("Inputs must be finite numbers, strings, booleans, null, lists, maps with unique string keys, or nodes")
            }
            Self::ConfigInvalid { .. } => Some("Run: mobility-cache config show"),
            Self::CachedRead { .. } => {
                Some("Delete the cached files to force the node to be rebuilt")
            }
            _ => None,
        }
    }
}
