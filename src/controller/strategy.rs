//! Fetch strategies
//!
//! Both strategies read and write a single partition. Concurrent requests
//! for the same resource may each miss and each fetch; writes are
//! idempotent so the last writer wins.

use crate::error::{SwcacheError, SwcacheResult};
use crate::fetch::Fetcher;
use crate::http::{Request, Response};
use crate::storage::CacheStorage;
use futures_util::future::BoxFuture;
use std::fmt;
use tracing::{debug, warn};

/// Navigation preload handed to the controller by the host
///
/// Resolves to `Ok(None)` when the host started no usable preload.
pub type PreloadFuture = BoxFuture<'static, SwcacheResult<Option<Response>>>;

/// Per-request context supplied by the host
#[derive(Default)]
pub struct FetchContext {
    preload: Option<PreloadFuture>,
}

impl FetchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preload(preload: PreloadFuture) -> Self {
        Self {
            preload: Some(preload),
        }
    }

    pub(crate) fn take_preload(&mut self) -> Option<PreloadFuture> {
        self.preload.take()
    }
}

/// Where a served response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Found in a partition
    Cache,
    /// Fetched by the controller
    Network,
    /// Navigation preload started by the host
    Preload,
    /// Root document served after a failed navigation
    ShellFallback,
    /// Not intercepted; fetched as if no controller existed
    Passthrough,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
            Self::Preload => write!(f, "preload"),
            Self::ShellFallback => write!(f, "shell-fallback"),
            Self::Passthrough => write!(f, "passthrough"),
        }
    }
}

/// A response together with its source
#[derive(Debug, Clone)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    pub fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Cache key for a request; unparseable URLs never reach a strategy
pub(crate) fn cache_key(request: &Request) -> SwcacheResult<String> {
    request.cache_key().ok_or_else(|| SwcacheError::InvalidUrl {
        url: request.url.clone(),
        reason: "not an absolute URL".to_string(),
    })
}

/// Store a clone of `response` under `key`
///
/// A failed write is logged and otherwise ignored: the caller already has a
/// good response to return.
async fn store(storage: &dyn CacheStorage, partition: &str, key: &str, response: &Response) {
    if !response.is_cacheable() {
        debug!("Not caching {} (status {})", key, response.status);
        return;
    }

    if let Err(e) = storage.put(partition, key, response.clone()).await {
        warn!("Failed to cache {} in {}: {}", key, partition, e);
    }
}

/// Serve from `partition` if present, otherwise fetch and store
///
/// Cached entries are never revalidated; the versioned partition name is
/// the only invalidation. A network error on a miss propagates.
pub async fn cache_first(
    storage: &dyn CacheStorage,
    fetcher: &dyn Fetcher,
    partition: &str,
    request: &Request,
) -> SwcacheResult<Served> {
    let key = cache_key(request)?;

    if let Some(cached) = storage.match_entry(partition, &key).await? {
        debug!("Cache hit in {}: {}", partition, key);
        return Ok(Served::new(cached, ResponseSource::Cache));
    }

    debug!("Cache miss in {}: {}", partition, key);
    let response = fetcher.fetch(request).await?;
    store(storage, partition, &key, &response).await;
    Ok(Served::new(response, ResponseSource::Network))
}

/// Prefer a fresh response, falling back to `partition` on failure
///
/// Order: preload (if the host started one), then a normal fetch, then the
/// cached entry. With no cached entry the fetch error is returned.
pub async fn network_first(
    storage: &dyn CacheStorage,
    fetcher: &dyn Fetcher,
    partition: &str,
    request: &Request,
    ctx: &mut FetchContext,
) -> SwcacheResult<Served> {
    let key = cache_key(request)?;

    if let Some(preload) = ctx.take_preload() {
        match preload.await {
            Ok(Some(response)) => {
                debug!("Using navigation preload for {}", key);
                store(storage, partition, &key, &response).await;
                return Ok(Served::new(response, ResponseSource::Preload));
            }
            Ok(None) => debug!("Navigation preload empty for {}", key),
            Err(e) => debug!("Navigation preload failed for {}: {}", key, e),
        }
    }

    let error = match fetcher.fetch(request).await {
        Ok(response) => {
            store(storage, partition, &key, &response).await;
            return Ok(Served::new(response, ResponseSource::Network));
        }
        Err(e) => e,
    };

    debug!("Network failed for {}, trying {}: {}", key, partition, error);
    match storage.match_entry(partition, &key).await {
        Ok(Some(cached)) => Ok(Served::new(cached, ResponseSource::Cache)),
        Ok(None) => Err(error),
        Err(lookup) => {
            warn!("Cache lookup in {} failed: {}", partition, lookup);
            Err(error)
        }
    }
}
