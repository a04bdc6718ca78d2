//! swcache - Offline caching controller for a web origin
//!
//! Installs versioned cache partitions for an origin and serves its
//! requests cache-first or network-first, falling back to the cached app
//! shell when a navigation cannot reach the network.

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod http;
pub mod storage;
pub mod ui;
pub mod worker;

pub use error::{SwcacheError, SwcacheResult};
