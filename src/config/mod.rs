//! Configuration management for mobility-cache
//!
//! The cache engine never reads the environment itself; it is handed a
//! [`CacheConfig`]. This module is where that value comes from.

pub mod schema;

pub use schema::{CacheConfig, Config, GeneralConfig};

use crate::error::{CacheError, CacheResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding `cache.project_root`
pub const PROJECT_ROOT_ENV: &str = "MOBILITY_PROJECT_DATA_FOLDER";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mobility-cache")
            .join("config.toml")
    }

    /// Load configuration (defaults if the file is absent), then apply
    /// environment overrides
    pub fn load(&self) -> CacheResult<Config> {
        let mut config = if self.config_path.exists() {
            self.load_from_file(&self.config_path)?
        } else {
            debug!("Config file not found, using defaults");
            Config::default()
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> CacheResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| CacheError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| CacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> CacheResult<()> {
        self.ensure_config_dir()?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).map_err(|e| {
            CacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    fn ensure_config_dir(&self) -> CacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply environment overrides using `lookup` to read variables
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(root) = lookup(PROJECT_ROOT_ENV).filter(|v| !v.is_empty()) {
        debug!("Project root overridden by {}: {}", PROJECT_ROOT_ENV, root);
        config.cache.project_root = PathBuf::from(root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        std::env::remove_var(PROJECT_ROOT_ENV);
        let config = manager.load().unwrap();
        assert_eq!(config.general.log_format, "text");
        assert!(config.cache.create_dirs);
    }

    #[test]
    #[serial]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.cache.project_root = PathBuf::from("/data/grenoble");
        config.cache.create_dirs = false;

        std::env::remove_var(PROJECT_ROOT_ENV);
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.cache.project_root, PathBuf::from("/data/grenoble"));
        assert!(!loaded.cache.create_dirs);
    }

    #[test]
    #[serial]
    fn env_var_overrides_project_root() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("config.toml"));

        std::env::set_var(PROJECT_ROOT_ENV, temp.path());
        let config = manager.load().unwrap();
        std::env::remove_var(PROJECT_ROOT_ENV);

        assert_eq!(config.cache.project_root, temp.path());
    }

    #[test]
    fn empty_override_ignored() {
        let mut config = Config::default();
        let before = config.cache.project_root.clone();
        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.cache.project_root, before);
    }

    #[test]
    fn invalid_file_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[cache\nproject_root = 1").unwrap();

        let err = ConfigManager::with_path(path).load().unwrap_err();
        assert!(matches!(err, CacheError::ConfigInvalid { .. }));
    }
}
