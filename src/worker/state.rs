//! Registration state persistence

use crate::controller::{CacheVersion, ControllerState};
use crate::error::{SwcacheError, SwcacheResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const RECORD_FILE: &str = "registration.json";

/// Persisted view of the active controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Controller instance ID
    pub controller_id: Uuid,

    /// Origin the controller serves
    pub origin: String,

    /// Cache version
    pub version: CacheVersion,

    /// Registration URL the version was read from, if any
    pub registration_url: Option<String>,

    /// Lifecycle state at the time of the last save
    pub state: ControllerState,

    /// Whether navigation preload was enabled on activation
    pub navigation_preload: bool,

    /// When install finished
    pub installed_at: DateTime<Utc>,

    /// When activation finished
    pub activated_at: Option<DateTime<Utc>>,
}

impl RegistrationRecord {
    /// Get the record file path inside a state directory
    pub fn file_path(state_dir: &Path) -> PathBuf {
        state_dir.join(RECORD_FILE)
    }

    /// Load the record from a state directory
    pub async fn load(state_dir: &Path) -> SwcacheResult<Option<Self>> {
        let path = Self::file_path(state_dir);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            SwcacheError::io(format!("reading registration {}", path.display()), e)
        })?;

        let record: RegistrationRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// Save the record into a state directory
    pub async fn save(&self, state_dir: &Path) -> SwcacheResult<()> {
        fs::create_dir_all(state_dir)
            .await
            .map_err(|e| SwcacheError::io("creating state directory", e))?;

        let path = Self::file_path(state_dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await.map_err(|e| {
            SwcacheError::io(format!("writing registration {}", path.display()), e)
        })?;

        Ok(())
    }

    /// Delete the record file
    pub async fn delete(state_dir: &Path) -> SwcacheResult<()> {
        let path = Self::file_path(state_dir);
        if path.exists() {
            fs::remove_file(&path).await.map_err(|e| {
                SwcacheError::io(format!("deleting registration {}", path.display()), e)
            })?;
        }
        Ok(())
    }

    /// Whether the recorded controller may serve fetches
    pub fn is_active(&self) -> bool {
        self.state.intercepts_fetches()
    }
}
