//! Configuration schema for mobility-cache
//!
//! Configuration is stored at `~/.config/mobility-cache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache settings handed to every node construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Project cache root; relative nominal paths are anchored here
    pub project_root: PathBuf,

    /// Create missing parent directories before an asset is built
    pub create_dirs: bool,
}

impl CacheConfig {
    /// Settings rooted at `project_root`, other values default
    pub fn with_root(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            project_root: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mobility")
                .join("project"),
            create_dirs: true,
        }
    }
}
