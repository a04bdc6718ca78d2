//! In-memory cache storage

use super::{CacheStorage, EntryInfo};
use crate::error::SwcacheResult;
use crate::http::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredEntry {
    response: Response,
    cached_at: DateTime<Utc>,
}

type Partition = BTreeMap<String, StoredEntry>;

/// Cache storage held in process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    partitions: RwLock<BTreeMap<String, Partition>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> SwcacheResult<()> {
        self.partitions
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn has(&self, name: &str) -> SwcacheResult<bool> {
        Ok(self.partitions.read().await.contains_key(name))
    }

    async fn keys(&self) -> SwcacheResult<Vec<String>> {
        Ok(self.partitions.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> SwcacheResult<bool> {
        Ok(self.partitions.write().await.remove(name).is_some())
    }

    async fn match_entry(&self, name: &str, key: &str) -> SwcacheResult<Option<Response>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(name)
            .and_then(|p| p.get(key))
            .map(|e| e.response.clone()))
    }

    async fn put(&self, name: &str, key: &str, response: Response) -> SwcacheResult<()> {
        let entry = StoredEntry {
            response,
            cached_at: Utc::now(),
        };
        self.partitions
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), entry);
        Ok(())
    }

    async fn entries(&self, name: &str) -> SwcacheResult<Vec<EntryInfo>> {
        let partitions = self.partitions.read().await;
        let Some(partition) = partitions.get(name) else {
            return Ok(vec![]);
        };

        Ok(partition
            .iter()
            .map(|(key, e)| EntryInfo {
                key: key.clone(),
                status: e.response.status,
                size: e.response.body.len() as u64,
                cached_at: e.cached_at,
            })
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
