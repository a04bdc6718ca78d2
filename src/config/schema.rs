//! Configuration schema for swcache
//!
//! Configuration is stored at `~/.config/swcache/config.toml`

use crate::controller::{CacheVersion, PrecacheManifest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Controller settings
    pub controller: ControllerSettings,

    /// Network settings
    pub network: NetworkConfig,

    /// Cache storage settings
    pub storage: StorageConfig,
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

/// Controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Origin served by the controller, e.g. `https://example.com`
    pub origin: Option<String>,

    /// Registration URL; its `v` query parameter selects the cache version
    pub registration_url: Option<String>,

    /// Explicit cache version, overriding the registration URL
    pub version: Option<String>,

    /// Whether the host offers navigation preload
    pub navigation_preload: bool,

    /// Paths fetched during install
    pub precache: Vec<String>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            origin: None,
            registration_url: None,
            version: None,
            navigation_preload: true,
            precache: PrecacheManifest::default().paths().to_vec(),
        }
    }
}

impl ControllerSettings {
    /// Cache version: explicit version first, then the registration URL,
    /// then the default
    pub fn cache_version(&self) -> CacheVersion {
        match (&self.version, &self.registration_url) {
            (Some(version), _) => CacheVersion::new(version.as_str()),
            (None, Some(url)) => CacheVersion::from_registration_url(url),
            (None, None) => CacheVersion::default(),
        }
    }

    pub fn manifest(&self) -> PrecacheManifest {
        PrecacheManifest::new(self.precache.clone())
    }
}

/// Network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: crate::fetch::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Cache storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root (default: `<state dir>/caches`)
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the storage root against the state directory
    pub fn resolve_dir(&self, state_dir: &Path) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| state_dir.join("caches"))
    }
}
