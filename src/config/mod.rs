//! Loading and saving `config.toml`
//!
//! The config file only describes the controller and its host; all mutable
//! state (registration record, cache partitions) lives under the state
//! directory, which `--state-dir` can move independently.

pub mod schema;

pub use schema::Config;

use crate::error::{SwcacheError, SwcacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes one config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Use `explicit` when given (`--config` or `SWCACHE_CONFIG`), otherwise
    /// the per-user default
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        Self::with_path(explicit.unwrap_or_else(Self::default_config_path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config dir>/swcache/config.toml`
    pub fn default_config_path() -> PathBuf {
        Self::user_dir(dirs::config_dir()).join("config.toml")
    }

    /// `<state dir>/swcache`, or the local data dir on platforms without one
    pub fn default_state_dir() -> PathBuf {
        Self::user_dir(dirs::state_dir().or_else(dirs::data_local_dir))
    }

    fn user_dir(base: Option<PathBuf>) -> PathBuf {
        base.unwrap_or_else(|| PathBuf::from(".")).join("swcache")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the file is present; unreadable locations count as absent
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.config_path).await.unwrap_or(false)
    }

    /// Parse the file, or return defaults when there is none
    ///
    /// A file that exists but does not parse is an error.
    pub async fn load(&self) -> SwcacheResult<Config> {
        if !self.exists().await {
            debug!("No config at {}, using defaults", self.config_path.display());
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&self.config_path).await.map_err(|e| {
            SwcacheError::io(format!("reading {}", self.config_path.display()), e)
        })?;
        self.parse(&raw)
    }

    fn parse(&self, raw: &str) -> SwcacheResult<Config> {
        toml::from_str(raw).map_err(|e| SwcacheError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the parent directory first
    pub async fn save(&self, config: &Config) -> SwcacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SwcacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let rendered = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, rendered).await.map_err(|e| {
            SwcacheError::io(format!("writing {}", self.config_path.display()), e)
        })?;

        info!("Wrote configuration to {}", self.config_path.display());
        Ok(())
    }

    /// Create the state directory and the partition root beneath it
    pub async fn ensure_state_dirs(state_dir: &Path, storage_dir: &Path) -> SwcacheResult<()> {
        for dir in [state_dir, storage_dir] {
            fs::create_dir_all(dir).await.map_err(|e| {
                SwcacheError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_prefers_explicit_path() {
        let manager = ConfigManager::resolve(Some(PathBuf::from("/tmp/sw.toml")));
        assert_eq!(manager.path(), Path::new("/tmp/sw.toml"));

        let default = ConfigManager::resolve(None);
        assert!(default.path().ends_with("swcache/config.toml"));
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("absent.toml"));

        assert!(!manager.exists().await);
        let config = manager.load().await.unwrap();
        assert_eq!(config.general.log_format, "text");
        assert!(config.controller.origin.is_none());
    }

    #[tokio::test]
    async fn saved_origin_survives_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("nested/config.toml"));

        let mut config = Config::default();
        config.controller.origin = Some("https://example.com".to_string());
        config.controller.precache = vec!["/".to_string()];
        manager.save(&config).await.unwrap();

        assert!(manager.exists().await);
        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.controller.origin.as_deref(), Some("https://example.com"));
        assert_eq!(loaded.controller.precache, vec!["/"]);
    }

    #[tokio::test]
    async fn unparseable_file_names_its_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[network]\ntimeout_secs = \"soon\"\n")
            .await
            .unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        assert!(matches!(err, SwcacheError::ConfigInvalid { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn state_dirs_are_created() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state");
        let storage = state.join("caches");

        ConfigManager::ensure_state_dirs(&state, &storage).await.unwrap();
        assert!(storage.is_dir());
    }
}
