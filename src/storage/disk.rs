//! Directory-backed cache storage
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<partition>/partition.json    partition name + creation time
//! <root>/<partition>/<hash>.json       entry metadata (key, status, headers)
//! <root>/<partition>/<hash>.body       raw response body
//! ```
//!
//! `<hash>` is the first 16 hex chars of the SHA256 of the cache key.
//! Every file is written to a uniquely named temp path and renamed into
//! place, so concurrent writers of the same key never see a torn entry.

use super::{CacheStorage, EntryInfo};
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const PARTITION_META: &str = "partition.json";

#[derive(Debug, Serialize, Deserialize)]
struct PartitionMeta {
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    status: u16,
    headers: BTreeMap<String, String>,
    url: String,
    size: u64,
    cached_at: DateTime<Utc>,
}

/// Cache storage persisted under a directory
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, name: &str) -> PathBuf {
        self.root.join(sanitize_name(name))
    }

    async fn write_atomic(path: &Path, contents: &[u8]) -> SwcacheResult<()> {
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&temp_path, contents)
            .await
            .map_err(|e| SwcacheError::io(format!("writing {}", temp_path.display()), e))?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| SwcacheError::io(format!("renaming into {}", path.display()), e))?;
        Ok(())
    }

    async fn read_entry_meta(path: &Path) -> Option<EntryMeta> {
        let content = fs::read_to_string(path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("Skipping unreadable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> SwcacheResult<()> {
        let dir = self.partition_dir(name);
        let meta_path = dir.join(PARTITION_META);
        if meta_path.exists() {
            return Ok(());
        }

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SwcacheError::io(format!("creating partition {}", dir.display()), e))?;

        let meta = PartitionMeta {
            name: name.to_string(),
            created_at: Utc::now(),
        };
        Self::write_atomic(&meta_path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        debug!("Opened partition {} at {}", name, dir.display());
        Ok(())
    }

    async fn has(&self, name: &str) -> SwcacheResult<bool> {
        Ok(self.partition_dir(name).join(PARTITION_META).exists())
    }

    async fn keys(&self) -> SwcacheResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut names = vec![];
        let mut dirs = fs::read_dir(&self.root)
            .await
            .map_err(|e| SwcacheError::io("reading storage root", e))?;

        while let Some(entry) = dirs
            .next_entry()
            .await
            .map_err(|e| SwcacheError::io("reading storage entry", e))?
        {
            let meta_path = entry.path().join(PARTITION_META);
            let Ok(content) = fs::read_to_string(&meta_path).await else {
                continue;
            };
            if let Ok(meta) = serde_json::from_str::<PartitionMeta>(&content) {
                names.push(meta.name);
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> SwcacheResult<bool> {
        let dir = self.partition_dir(name);
        if !dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| SwcacheError::storage(name, e.to_string()))?;
        Ok(true)
    }

    async fn match_entry(&self, name: &str, key: &str) -> SwcacheResult<Option<Response>> {
        let dir = self.partition_dir(name);
        let hash = entry_hash(key);

        let Some(meta) = Self::read_entry_meta(&dir.join(format!("{hash}.json"))).await else {
            return Ok(None);
        };
        if meta.key != key {
            return Ok(None);
        }

        let body_path = dir.join(format!("{hash}.body"));
        let body = match fs::read(&body_path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SwcacheError::storage(name, e.to_string())),
        };

        Ok(Some(Response {
            status: meta.status,
            headers: meta.headers,
            body: body.into(),
            url: meta.url,
        }))
    }

    async fn put(&self, name: &str, key: &str, response: Response) -> SwcacheResult<()> {
        self.open(name).await?;

        let dir = self.partition_dir(name);
        let hash = entry_hash(key);
        let meta = EntryMeta {
            key: key.to_string(),
            status: response.status,
            headers: response.headers,
            url: response.url,
            size: response.body.len() as u64,
            cached_at: Utc::now(),
        };

        // Body first: a metadata file always points at a complete body
        Self::write_atomic(&dir.join(format!("{hash}.body")), &response.body).await?;
        Self::write_atomic(
            &dir.join(format!("{hash}.json")),
            serde_json::to_string_pretty(&meta)?.as_bytes(),
        )
        .await
    }

    async fn entries(&self, name: &str) -> SwcacheResult<Vec<EntryInfo>> {
        let dir = self.partition_dir(name);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut entries = vec![];
        let mut files = fs::read_dir(&dir)
            .await
            .map_err(|e| SwcacheError::io(format!("reading partition {}", name), e))?;

        while let Some(file) = files
            .next_entry()
            .await
            .map_err(|e| SwcacheError::io("reading partition entry", e))?
        {
            let path = file.path();
            let is_entry = path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|n| n != PARTITION_META);
            if !is_entry {
                continue;
            }
            if let Some(meta) = Self::read_entry_meta(&path).await {
                entries.push(EntryInfo {
                    key: meta.key,
                    status: meta.status,
                    size: meta.size,
                    cached_at: meta.cached_at,
                });
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

fn entry_hash(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Sanitize a partition name for use as a directory name.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("static-2"), "static-2");
        assert_eq!(sanitize_name("static/2"), "static_2");
        assert_eq!(sanitize_name("a:b"), "a_b");
    }

    #[test]
    fn entry_hash_is_stable() {
        let a = entry_hash("https://example.com/");
        assert_eq!(a.len(), 16);
        assert_eq!(a, entry_hash("https://example.com/"));
        assert_ne!(a, entry_hash("https://example.com/about"));
    }

    #[tokio::test]
    async fn put_and_match_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let key = "https://example.com/icons/icon-192.png";

        let storage = DiskStorage::new(temp.path());
        let response = Response::new(200, vec![0x89, 0x50, 0x4e, 0x47])
            .with_header("content-type", "image/png")
            .with_url(key);
        storage.put("static-2", key, response.clone()).await.unwrap();

        let reopened = DiskStorage::new(temp.path());
        let hit = reopened.match_entry("static-2", key).await.unwrap().unwrap();
        assert_eq!(hit, response);
        assert_eq!(reopened.keys().await.unwrap(), vec!["static-2"]);
    }

    #[tokio::test]
    async fn entries_lists_metadata() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());
        storage
            .put("runtime-2", "https://example.com/b", Response::new(404, "nope"))
            .await
            .unwrap();
        storage
            .put("runtime-2", "https://example.com/a", Response::new(200, "yes!"))
            .await
            .unwrap();

        let entries = storage.entries("runtime-2").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "https://example.com/a");
        assert_eq!(entries[0].size, 4);
        assert_eq!(entries[1].status, 404);
    }

    #[tokio::test]
    async fn delete_removes_partition() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path());
        storage.open("static-1").await.unwrap();
        storage.open("static-2").await.unwrap();

        assert!(storage.delete("static-1").await.unwrap());
        assert!(!storage.delete("static-1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["static-2"]);
        assert!(storage
            .match_entry("static-1", "https://example.com/")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn keys_on_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let storage = DiskStorage::new(temp.path().join("nope"));
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
