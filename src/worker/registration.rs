//! Hosting runtime for one origin
//!
//! A `Registration` plays the part a browser plays for a service worker:
//! it installs new controller versions, activates them, hands every fetch
//! to the active one, and falls back to a plain network fetch for
//! anything the controller leaves alone.

use crate::controller::{
    ActivateReport, CacheController, CacheVersion, ControllerConfig, ControllerState,
    FetchContext, FetchOutcome, InstallReport, PrecacheManifest, PreloadFuture, RequestClass,
    ResponseSource, Served, ServiceWorker, WorkerHost,
};
use crate::error::{SwcacheError, SwcacheResult};
use crate::fetch::Fetcher;
use crate::http::Request;
use crate::storage::CacheStorage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of registering a new controller version
#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub controller_id: Uuid,
    pub install: InstallReport,
    /// Present when the new version was activated right away
    pub activate: Option<ActivateReport>,
}

/// Service worker registration for a single origin
pub struct Registration {
    origin: String,
    precache: PrecacheManifest,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    preload_supported: bool,
    preload_enabled: AtomicBool,
    open_clients: AtomicUsize,
    controlled_clients: AtomicUsize,
    active: RwLock<Option<Arc<CacheController>>>,
    waiting: RwLock<Option<Arc<CacheController>>>,
}

impl Registration {
    /// Create a registration with no controller
    pub fn new(
        origin: impl Into<String>,
        precache: PrecacheManifest,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            origin: origin.into(),
            precache,
            storage,
            fetcher,
            preload_supported: true,
            preload_enabled: AtomicBool::new(false),
            open_clients: AtomicUsize::new(0),
            controlled_clients: AtomicUsize::new(0),
            active: RwLock::new(None),
            waiting: RwLock::new(None),
        }
    }

    /// Declare whether this host offers navigation preload
    pub fn with_navigation_preload(mut self, supported: bool) -> Self {
        self.preload_supported = supported;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Record a client page opening under this registration's scope
    pub fn open_client(&self) {
        self.open_clients.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of client pages controlled by the active version
    pub fn controlled_clients(&self) -> usize {
        self.controlled_clients.load(Ordering::SeqCst)
    }

    pub fn navigation_preload_enabled(&self) -> bool {
        self.preload_enabled.load(Ordering::SeqCst)
    }

    /// Currently active controller, if any
    pub async fn active(&self) -> Option<Arc<CacheController>> {
        self.active.read().await.clone()
    }

    /// Installed controller waiting to activate, if any
    pub async fn waiting(&self) -> Option<Arc<CacheController>> {
        self.waiting.read().await.clone()
    }

    /// Put back a controller that activated in an earlier process
    pub async fn restore_active(
        &self,
        controller_id: Uuid,
        version: CacheVersion,
        navigation_preload: bool,
    ) -> SwcacheResult<Arc<CacheController>> {
        let config = ControllerConfig::new(&self.origin, version, self.precache.clone())?;
        let controller = Arc::new(CacheController::restore(
            controller_id,
            config,
            self.storage.clone(),
            self.fetcher.clone(),
        ));

        self.preload_enabled
            .store(navigation_preload && self.preload_supported, Ordering::SeqCst);
        *self.active.write().await = Some(controller.clone());
        debug!("Restored controller {} ({})", controller_id, controller.config().version());
        Ok(controller)
    }

    /// Install a new controller version from its registration URL
    ///
    /// On install failure the new version is discarded and the current
    /// active version, if any, keeps serving.
    pub async fn register(&self, registration_url: &str) -> SwcacheResult<RegisterOutcome> {
        self.register_version(CacheVersion::from_registration_url(registration_url))
            .await
    }

    /// Install a new controller version
    pub async fn register_version(&self, version: CacheVersion) -> SwcacheResult<RegisterOutcome> {
        let config = ControllerConfig::new(&self.origin, version, self.precache.clone())?;
        let controller = Arc::new(CacheController::new(
            config,
            self.storage.clone(),
            self.fetcher.clone(),
        ));

        let install = match controller.on_install().await {
            Ok(report) => report,
            Err(e) => {
                if let Some(active) = self.active().await {
                    warn!(
                        "Keeping version {} active after failed install",
                        active.config().version()
                    );
                }
                return Err(e);
            }
        };

        *self.waiting.write().await = Some(controller.clone());

        let activate = if install.skip_waiting {
            Some(self.activate_waiting().await?)
        } else {
            None
        };

        Ok(RegisterOutcome {
            controller_id: controller.id(),
            install,
            activate,
        })
    }

    /// Activate the waiting controller, retiring the current one
    ///
    /// The current controller keeps serving until the new one has finished
    /// activating. If activation fails it stays active.
    pub async fn activate_waiting(&self) -> SwcacheResult<ActivateReport> {
        let Some(next) = self.waiting.write().await.take() else {
            return Err(SwcacheError::Internal(
                "No waiting controller to activate".to_string(),
            ));
        };

        let report = match next.on_activate(self).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Activation of controller {} failed: {}", next.id(), e);
                return Err(e);
            }
        };

        let previous = self.active.write().await.replace(next);
        if let Some(previous) = previous {
            if let Err(e) = previous.retire().await {
                warn!("Failed to retire controller {}: {}", previous.id(), e);
            }
        }
        Ok(report)
    }

    /// Handle one request the way a controlled page would see it
    pub async fn dispatch(&self, request: &Request) -> SwcacheResult<Served> {
        let Some(controller) = self.active().await else {
            return self.passthrough(request).await;
        };

        let ctx = self.preload_context(&controller, request);
        match controller.on_fetch(request, ctx).await? {
            FetchOutcome::Respond(served) => Ok(served),
            FetchOutcome::Passthrough => self.passthrough(request).await,
        }
    }

    async fn passthrough(&self, request: &Request) -> SwcacheResult<Served> {
        let response = self.fetcher.fetch(request).await?;
        Ok(Served::new(response, ResponseSource::Passthrough))
    }

    /// Start the navigation preload before the controller runs
    fn preload_context(&self, controller: &CacheController, request: &Request) -> FetchContext {
        let is_navigation = controller.route(request).class() == Some(RequestClass::Navigation);
        if !is_navigation || !self.navigation_preload_enabled() {
            return FetchContext::new();
        }

        let fetcher = self.fetcher.clone();
        let preload_request = request.clone();
        let handle = tokio::spawn(async move { fetcher.fetch(&preload_request).await });

        let preload: PreloadFuture = Box::pin(async move {
            match handle.await {
                Ok(Ok(response)) => Ok(Some(response)),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(SwcacheError::Internal(format!("Preload task failed: {}", e))),
            }
        });
        FetchContext::with_preload(preload)
    }

    /// State of the active controller, if any
    pub async fn active_state(&self) -> Option<ControllerState> {
        match self.active().await {
            Some(controller) => Some(controller.state().await),
            None => None,
        }
    }
}

#[async_trait]
impl WorkerHost for Registration {
    async fn claim_clients(&self) -> SwcacheResult<usize> {
        let open = self.open_clients.load(Ordering::SeqCst);
        self.controlled_clients.store(open, Ordering::SeqCst);
        Ok(open)
    }

    fn supports_navigation_preload(&self) -> bool {
        self.preload_supported
    }

    async fn enable_navigation_preload(&self) -> SwcacheResult<()> {
        if !self.preload_supported {
            return Err(SwcacheError::Internal(
                "Navigation preload is not supported by this host".to_string(),
            ));
        }
        self.preload_enabled.store(true, Ordering::SeqCst);
        info!("Navigation preload enabled for {}", self.origin);
        Ok(())
    }
}
