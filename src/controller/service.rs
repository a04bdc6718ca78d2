//! Host-facing controller interface
//!
//! The hosting runtime drives a controller through three entry points
//! and offers a few capabilities back to it during activation.

use crate::controller::config::CacheVersion;
use crate::controller::strategy::{FetchContext, Served};
use crate::error::SwcacheResult;
use crate::http::Request;
use async_trait::async_trait;

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub version: CacheVersion,
    /// Number of manifest entries stored
    pub cached: usize,
    /// Ask the host to activate without waiting for open clients to close
    pub skip_waiting: bool,
}

/// Outcome of an activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stale partitions removed
    pub deleted: Vec<String>,
    /// Stale partitions that could not be removed
    pub failed: Vec<String>,
    /// Client pages taken under control
    pub claimed: usize,
    /// Whether navigation preload was enabled
    pub navigation_preload: bool,
}

/// Result of handing a fetch to the controller
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not intercepted; the host fetches as if no controller existed
    Passthrough,
    /// The controller produced a response
    Respond(Served),
}

/// Capabilities the host offers during activation
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Take control of already-open client pages; returns how many
    async fn claim_clients(&self) -> SwcacheResult<usize>;

    /// Feature check for navigation preload
    fn supports_navigation_preload(&self) -> bool;

    /// Enable navigation preload for subsequent navigations
    async fn enable_navigation_preload(&self) -> SwcacheResult<()>;
}

/// Lifecycle and fetch entry points invoked by the host
#[async_trait]
pub trait ServiceWorker: Send + Sync {
    /// Populate the precache. Any failure discards this version.
    async fn on_install(&self) -> SwcacheResult<InstallReport>;

    /// Evict stale partitions and take control
    async fn on_activate(&self, host: &dyn WorkerHost) -> SwcacheResult<ActivateReport>;

    /// Route one request to a strategy
    async fn on_fetch(&self, request: &Request, ctx: FetchContext) -> SwcacheResult<FetchOutcome>;
}
