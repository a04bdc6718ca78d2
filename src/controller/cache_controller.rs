//! The cache controller: lifecycle plus request routing

use crate::controller::config::ControllerConfig;
use crate::controller::route::{route, RequestClass, Route};
use crate::controller::service::{
    ActivateReport, FetchOutcome, InstallReport, ServiceWorker, WorkerHost,
};
use crate::controller::state::ControllerState;
use crate::controller::strategy::{
    cache_first, cache_key, network_first, FetchContext, ResponseSource, Served,
};
use crate::error::{SwcacheError, SwcacheResult};
use crate::fetch::Fetcher;
use crate::http::{Request, Response};
use crate::storage::CacheStorage;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One version of the offline cache controller
pub struct CacheController {
    id: Uuid,
    config: ControllerConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<ControllerState>,
}

impl CacheController {
    /// Create a controller that has yet to install
    pub fn new(
        config: ControllerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            storage,
            fetcher,
            state: RwLock::new(ControllerState::Installing),
        }
    }

    /// Rebuild a controller that already activated in an earlier process
    ///
    /// Its partitions are taken as they are on storage; nothing is fetched.
    pub fn restore(
        id: Uuid,
        config: ControllerConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            id,
            config,
            storage,
            fetcher,
            state: RwLock::new(ControllerState::Activated),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub async fn state(&self) -> ControllerState {
        *self.state.read().await
    }

    /// Route a request without executing it
    pub fn route(&self, request: &Request) -> Route {
        route(request, self.config.origin())
    }

    /// Move to `next`, rejecting steps the lifecycle does not allow
    pub async fn transition(&self, next: ControllerState) -> SwcacheResult<()> {
        let mut state = self.state.write().await;
        if !state.can_transition_to(next) {
            return Err(SwcacheError::InvalidTransition {
                from: state.to_string(),
                to: next.to_string(),
            });
        }

        debug!(
            "Controller {} ({}): {} -> {}",
            self.id,
            self.config.version(),
            *state,
            next
        );
        *state = next;
        Ok(())
    }

    /// Mark this version as superseded
    pub async fn retire(&self) -> SwcacheResult<()> {
        self.transition(ControllerState::Redundant).await
    }

    /// Fetch every manifest entry; any error or non-ok status fails
    async fn fetch_precache(&self) -> SwcacheResult<Vec<(String, Response)>> {
        let urls = self.config.precache().resolve(self.config.base())?;
        let fetcher = self.fetcher.as_ref();

        let fetches = urls.into_iter().map(|url| async move {
            let request = Request::get(url.as_str());
            match fetcher.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    cache_key(&request).map(|key| (key, response))
                }
                Ok(response) => Err(SwcacheError::InstallFailed {
                    url,
                    reason: format!("HTTP {}", response.status),
                }),
                Err(e) => Err(SwcacheError::InstallFailed {
                    url,
                    reason: e.to_string(),
                }),
            }
        });

        try_join_all(fetches).await
    }

    async fn install(&self) -> SwcacheResult<InstallReport> {
        let static_cache = self.config.static_cache();
        let existed = self.storage.has(static_cache).await?;
        self.storage.open(static_cache).await?;

        // Nothing is written until every fetch has succeeded
        let entries = match self.fetch_precache().await {
            Ok(entries) => entries,
            Err(e) => {
                if !existed {
                    self.drop_partial(static_cache).await;
                }
                return Err(e);
            }
        };
        let cached = entries.len();

        for (key, response) in entries {
            if let Err(e) = self.storage.put(static_cache, &key, response).await {
                if !existed {
                    self.drop_partial(static_cache).await;
                }
                return Err(SwcacheError::InstallFailed {
                    url: key,
                    reason: e.to_string(),
                });
            }
        }

        self.storage.open(self.config.runtime_cache()).await?;

        Ok(InstallReport {
            version: self.config.version().clone(),
            cached,
            skip_waiting: true,
        })
    }

    async fn drop_partial(&self, partition: &str) {
        if let Err(e) = self.storage.delete(partition).await {
            warn!("Failed to drop partial partition {}: {}", partition, e);
        }
    }

    /// Delete every partition that does not belong to this version
    async fn evict_stale(&self, report: &mut ActivateReport) {
        let keys = match self.storage.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list partitions during activation: {}", e);
                return;
            }
        };

        for key in keys.into_iter().filter(|k| !self.config.owns_partition(k)) {
            match self.storage.delete(&key).await {
                Ok(true) => {
                    info!("Deleted stale partition {}", key);
                    report.deleted.push(key);
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to delete stale partition {}: {}", key, e);
                    report.failed.push(key);
                }
            }
        }
    }

    async fn navigate(&self, request: &Request, ctx: &mut FetchContext) -> SwcacheResult<Served> {
        let error = match network_first(
            self.storage.as_ref(),
            self.fetcher.as_ref(),
            self.config.runtime_cache(),
            request,
            ctx,
        )
        .await
        {
            Ok(served) => return Ok(served),
            Err(e) => e,
        };

        let root = self.config.root_document();
        match self
            .storage
            .match_entry(self.config.static_cache(), &root)
            .await
        {
            Ok(Some(shell)) => {
                info!("Offline navigation to {}, serving app shell", request.url);
                Ok(Served::new(shell, ResponseSource::ShellFallback))
            }
            Ok(None) => Err(error),
            Err(lookup) => {
                warn!("App shell lookup failed: {}", lookup);
                Err(error)
            }
        }
    }
}

#[async_trait]
impl ServiceWorker for CacheController {
    async fn on_install(&self) -> SwcacheResult<InstallReport> {
        let current = self.state().await;
        if current != ControllerState::Installing {
            return Err(SwcacheError::InvalidTransition {
                from: current.to_string(),
                to: ControllerState::Installed.to_string(),
            });
        }

        info!(
            "Installing version {} ({} precache entries)",
            self.config.version(),
            self.config.precache().len()
        );

        match self.install().await {
            Ok(report) => {
                self.transition(ControllerState::Installed).await?;
                info!("Installed version {}: {} entries cached", report.version, report.cached);
                Ok(report)
            }
            Err(e) => {
                self.transition(ControllerState::InstallFailed).await?;
                warn!("Install of version {} failed: {}", self.config.version(), e);
                Err(e)
            }
        }
    }

    async fn on_activate(&self, host: &dyn WorkerHost) -> SwcacheResult<ActivateReport> {
        self.transition(ControllerState::Activating).await?;

        let mut report = ActivateReport::default();
        self.evict_stale(&mut report).await;

        report.claimed = match host.claim_clients().await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!("Failed to claim clients: {}", e);
                0
            }
        };

        if host.supports_navigation_preload() {
            match host.enable_navigation_preload().await {
                Ok(()) => report.navigation_preload = true,
                Err(e) => warn!("Failed to enable navigation preload: {}", e),
            }
        }

        self.transition(ControllerState::Activated).await?;
        info!(
            "Activated version {} (deleted {} stale partitions)",
            self.config.version(),
            report.deleted.len()
        );
        Ok(report)
    }

    async fn on_fetch(
        &self,
        request: &Request,
        mut ctx: FetchContext,
    ) -> SwcacheResult<FetchOutcome> {
        if !self.state().await.intercepts_fetches() {
            return Ok(FetchOutcome::Passthrough);
        }

        let class = match self.route(request) {
            Route::Passthrough(reason) => {
                debug!("Passthrough {} {}: {}", request.method, request.url, reason);
                return Ok(FetchOutcome::Passthrough);
            }
            Route::Intercept(class) => class,
        };

        debug!("Intercept {} as {}", request.url, class);
        let served = match class {
            RequestClass::Navigation => self.navigate(request, &mut ctx).await?,
            RequestClass::StaticAsset => {
                cache_first(
                    self.storage.as_ref(),
                    self.fetcher.as_ref(),
                    self.config.static_cache(),
                    request,
                )
                .await?
            }
            RequestClass::Other => {
                network_first(
                    self.storage.as_ref(),
                    self.fetcher.as_ref(),
                    self.config.runtime_cache(),
                    request,
                    &mut ctx,
                )
                .await?
            }
        };

        Ok(FetchOutcome::Respond(served))
    }
}
