//! Offline cache controller
//!
//! Owns the versioned cache partitions of one origin and decides, per
//! request, how to serve it.
//!
//! # Partitions
//!
//! | Partition | Filled by | Read by |
//! |-----------|-----------|---------|
//! | `static-<v>` | install (precache), cache-first misses | static assets, offline shell |
//! | `runtime-<v>` | network-first successes | navigations, other GETs |
//!
//! Activating version `v` deletes every partition not named for `v`.
//!
//! # Strategies
//!
//! | Class | Strategy | Fallback |
//! |-------|----------|----------|
//! | navigation | network-first with preload | cached entry, then root document |
//! | static asset | cache-first | none; network errors propagate |
//! | other | network-first with preload | cached entry |

mod cache_controller;
pub mod config;
pub mod route;
mod service;
mod state;
pub mod strategy;

pub use cache_controller::CacheController;
pub use config::{CacheVersion, ControllerConfig, PrecacheManifest};
pub use route::{is_static_asset, route, PassthroughReason, RequestClass, Route};
pub use service::{ActivateReport, FetchOutcome, InstallReport, ServiceWorker, WorkerHost};
pub use state::ControllerState;
pub use strategy::{FetchContext, PreloadFuture, ResponseSource, Served};
