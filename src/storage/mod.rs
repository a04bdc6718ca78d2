//! Cache storage for versioned partitions
//!
//! A partition is a named bucket of request/response pairs (`static-2`,
//! `runtime-2`, ...). Storage is shared by every in-flight fetch, so each
//! implementation makes single `get`/`put`/`delete` calls atomic; nothing
//! needs multi-key transactions.
//!
//! | Backend | Persistence | Used by |
//! |---------|-------------|---------|
//! | `MemoryStorage` | process lifetime | tests, embedding hosts |
//! | `DiskStorage` | directory tree | CLI |

mod disk;
mod memory;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

use crate::error::SwcacheResult;
use crate::http::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one stored entry, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Cache key (request URL without fragment)
    pub key: String,
    /// Stored response status
    pub status: u16,
    /// Body size in bytes
    pub size: u64,
    /// When the entry was written
    pub cached_at: DateTime<Utc>,
}

/// Host-provided cache store, safe for concurrent use
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the partition if absent
    async fn open(&self, name: &str) -> SwcacheResult<()>;

    /// Check whether a partition exists
    async fn has(&self, name: &str) -> SwcacheResult<bool>;

    /// List partition names, sorted
    async fn keys(&self) -> SwcacheResult<Vec<String>>;

    /// Drop a partition and all its entries. Returns false if it was absent.
    async fn delete(&self, name: &str) -> SwcacheResult<bool>;

    /// Look up an entry. A missing partition is a miss, not an error.
    async fn match_entry(&self, name: &str, key: &str) -> SwcacheResult<Option<Response>>;

    /// Insert or overwrite an entry, creating the partition if needed
    async fn put(&self, name: &str, key: &str, response: Response) -> SwcacheResult<()>;

    /// List the entries of a partition
    async fn entries(&self, name: &str) -> SwcacheResult<Vec<EntryInfo>>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
