//! Network access for the controller
//!
//! A `Fetcher` is the controller's only way onto the network. Like the
//! Fetch API, an HTTP error status is a successful fetch; `Err` means the
//! request never produced a response (offline, DNS failure, refused
//! connection, timeout).

mod client;

pub use client::{HttpFetcher, DEFAULT_USER_AGENT};

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Abstract network interface
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request and return whatever the server answered
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response>;

    /// Human-readable fetcher name for display
    fn fetcher_name(&self) -> &'static str;
}

/// Fetcher for a host with no network: every request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        Err(SwcacheError::network(&request.url, "network is offline"))
    }

    fn fetcher_name(&self) -> &'static str {
        "offline"
    }
}
