//! Wiring between configuration and the hosting runtime

use crate::config::Config;
use crate::error::{SwcacheError, SwcacheResult};
use crate::fetch::{Fetcher, HttpFetcher, OfflineFetcher};
use crate::storage::{CacheStorage, DiskStorage};
use crate::worker::{Registration, RegistrationRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Resolved paths and settings shared by every command
pub struct HostEnv {
    config: Config,
    config_path: PathBuf,
    state_dir: PathBuf,
    storage_dir: PathBuf,
}

impl HostEnv {
    pub fn new(config: Config, config_path: PathBuf, state_dir: PathBuf) -> Self {
        let storage_dir = config.storage.resolve_dir(&state_dir);
        Self {
            config,
            config_path,
            state_dir,
            storage_dir,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn storage(&self) -> Arc<dyn CacheStorage> {
        Arc::new(DiskStorage::new(&self.storage_dir))
    }

    /// HTTP fetcher from `[network]`, or one that always fails
    pub fn fetcher(&self, offline: bool) -> Arc<dyn Fetcher> {
        if offline {
            return Arc::new(OfflineFetcher);
        }
        Arc::new(HttpFetcher::new(
            self.config.network.timeout(),
            self.config.network.user_agent.clone(),
        ))
    }

    /// Origin from the command line, then the config file
    pub fn origin(&self, flag: Option<&str>) -> SwcacheResult<String> {
        flag.map(str::to_string)
            .or_else(|| self.config.controller.origin.clone())
            .ok_or(SwcacheError::OriginMissing)
    }

    pub async fn record(&self) -> SwcacheResult<Option<RegistrationRecord>> {
        RegistrationRecord::load(&self.state_dir).await
    }

    /// Build a registration for `origin`, restoring the recorded controller
    /// when it belongs to the same origin
    pub async fn registration(&self, origin: &str, offline: bool) -> SwcacheResult<Registration> {
        let registration = Registration::new(
            origin,
            self.config.controller.manifest(),
            self.storage(),
            self.fetcher(offline),
        )
        .with_navigation_preload(self.config.controller.navigation_preload);

        if let Some(record) = self.record().await? {
            if record.is_active() && same_origin(&record.origin, origin) {
                registration
                    .restore_active(record.controller_id, record.version, record.navigation_preload)
                    .await?;
            } else {
                debug!("Ignoring registration record for {}", record.origin);
            }
        }

        Ok(registration)
    }
}

fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}

/// Turn a path on the origin, or an absolute URL, into a request URL
pub fn resolve_target(origin: &str, target: &str) -> SwcacheResult<String> {
    let invalid = |reason: String| SwcacheError::InvalidUrl {
        url: target.to_string(),
        reason,
    };

    if let Ok(absolute) = Url::parse(target) {
        return Ok(absolute.to_string());
    }

    let base = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
    let joined = base.join(target).map_err(|e| invalid(e.to_string()))?;
    Ok(joined.to_string())
}
