//! Controller scenarios against in-memory storage and a scripted network

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use swcache::controller::{
    route, ControllerState, PrecacheManifest, RequestClass, ResponseSource, Route,
};
use swcache::fetch::Fetcher;
use swcache::http::{Method, Request, Response};
use swcache::storage::{CacheStorage, MemoryStorage};
use swcache::worker::Registration;
use swcache::{SwcacheError, SwcacheResult};
use url::Url;

const ORIGIN: &str = "https://example.com";

/// Serves a body per URL; unknown URLs get a 404
#[derive(Default)]
struct MockFetcher {
    bodies: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    failing: Mutex<Vec<String>>,
}

impl MockFetcher {
    fn with(paths: &[(&str, &str)]) -> Arc<Self> {
        let fetcher = Self::default();
        {
            let mut bodies = fetcher.bodies.lock().unwrap();
            for (path, body) in paths {
                bodies.insert(format!("{}{}", ORIGIN, path), body.to_string());
            }
        }
        Arc::new(fetcher)
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn fail(&self, path: &str) {
        self.failing.lock().unwrap().push(format!("{}{}", ORIGIN, path));
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        self.calls.lock().unwrap().push(request.url.clone());

        if self.offline.load(Ordering::SeqCst)
            || self.failing.lock().unwrap().contains(&request.url)
        {
            return Err(SwcacheError::network(&request.url, "connection refused"));
        }

        let body = self.bodies.lock().unwrap().get(&request.url).cloned();
        Ok(match body {
            Some(body) => Response::new(200, body).with_url(request.url.clone()),
            None => Response::new(404, "not found").with_url(request.url.clone()),
        })
    }

    fn fetcher_name(&self) -> &'static str {
        "mock"
    }
}

fn registration(
    fetcher: Arc<MockFetcher>,
    storage: Arc<MemoryStorage>,
    manifest: &[&str],
) -> Registration {
    Registration::new(
        ORIGIN,
        PrecacheManifest::new(manifest.iter().map(|p| p.to_string()).collect()),
        storage,
        fetcher,
    )
}

fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

#[tokio::test]
async fn version_isolation() {
    let fetcher = MockFetcher::with(&[("/", "shell v1"), ("/logo.svg", "<svg/>")]);
    let storage = Arc::new(MemoryStorage::new());
    let reg = registration(fetcher.clone(), storage.clone(), &["/"]);

    reg.register("/sw.js?v=1").await.unwrap();
    reg.dispatch(&Request::get(url("/logo.svg"))).await.unwrap();
    assert!(storage
        .match_entry("static-1", &url("/logo.svg"))
        .await
        .unwrap()
        .is_some());

    let outcome = reg.register("/sw.js?v=2").await.unwrap();
    let deleted = outcome.activate.unwrap().deleted;
    assert!(deleted.contains(&"static-1".to_string()));
    assert!(deleted.contains(&"runtime-1".to_string()));
    assert_eq!(
        storage.keys().await.unwrap(),
        vec!["runtime-2".to_string(), "static-2".to_string()]
    );

    // v2 has never seen the asset, so it must go to the network again
    let before = fetcher.calls_to(&url("/logo.svg"));
    let served = reg.dispatch(&Request::get(url("/logo.svg"))).await.unwrap();
    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(fetcher.calls_to(&url("/logo.svg")), before + 1);
}

#[tokio::test]
async fn install_is_all_or_nothing() {
    let fetcher = MockFetcher::with(&[
        ("/", "shell"),
        ("/about", "about"),
        ("/favicon.ico", "ico"),
    ]);
    fetcher.fail("/about");
    let storage = Arc::new(MemoryStorage::new());
    let reg = registration(fetcher, storage.clone(), &["/", "/about", "/favicon.ico"]);

    let err = reg.register("/sw.js?v=3").await.unwrap_err();
    assert!(matches!(err, SwcacheError::InstallFailed { ref url, .. } if url.ends_with("/about")));
    assert!(err.is_retryable());

    assert!(reg.active().await.is_none());
    assert!(reg.waiting().await.is_none());
    assert!(storage.entries("static-3").await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn install_rejects_error_status() {
    // "/missing" is unknown to the mock and answers 404
    let fetcher = MockFetcher::with(&[("/", "shell")]);
    let storage = Arc::new(MemoryStorage::new());
    let reg = registration(fetcher, storage.clone(), &["/", "/missing"]);

    let err = reg.register("/sw.js").await.unwrap_err();
    assert!(err.to_string().contains("HTTP 404"));
    assert!(storage.entries("static-2").await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn cached_static_asset_fetched_once() {
    let fetcher = MockFetcher::with(&[("/", "shell"), ("/styles/site.css", "body{}")]);
    let reg = registration(fetcher.clone(), Arc::new(MemoryStorage::new()), &["/"]);
    reg.register("/sw.js").await.unwrap();

    let first = reg.dispatch(&Request::get(url("/styles/site.css"))).await.unwrap();
    let second = reg.dispatch(&Request::get(url("/styles/site.css"))).await.unwrap();

    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(second.source, ResponseSource::Cache);
    assert_eq!(second.response.text(), "body{}");
    assert_eq!(fetcher.calls_to(&url("/styles/site.css")), 1);
}

#[test]
fn every_same_origin_get_has_one_class() {
    let origin = Url::parse(ORIGIN).unwrap().origin();
    let cases = [
        (Request::navigate(url("/pricing")), RequestClass::Navigation),
        (Request::navigate(url("/brand/wordmark.svg")), RequestClass::Navigation),
        (Request::get(url("/assets/app.JS")), RequestClass::StaticAsset),
        (Request::get(url("/fonts/inter.woff2")), RequestClass::StaticAsset),
        (Request::get(url("/images/hero.webp?w=640")), RequestClass::StaticAsset),
        (Request::get(url("/api/health")), RequestClass::Other),
        (Request::get(url("/sitemap.xml")), RequestClass::Other),
    ];

    for (request, expected) in cases {
        assert_eq!(
            route(&request, &origin),
            Route::Intercept(expected),
            "{}",
            request.url
        );
    }
}

#[tokio::test]
async fn post_and_cross_origin_pass_through() {
    let fetcher = MockFetcher::with(&[("/", "shell")]);
    let storage = Arc::new(MemoryStorage::new());
    let reg = registration(fetcher.clone(), storage.clone(), &["/"]);
    reg.register("/sw.js").await.unwrap();

    let post = Request::new(Method::POST, url("/api/contact"));
    let served = reg.dispatch(&post).await.unwrap();
    assert_eq!(served.source, ResponseSource::Passthrough);

    let foreign = Request::get("https://cdn.example.net/lib.js");
    let served = reg.dispatch(&foreign).await.unwrap();
    assert_eq!(served.source, ResponseSource::Passthrough);
    assert_eq!(served.response.status, 404);

    // Neither response was stored
    for partition in storage.keys().await.unwrap() {
        for entry in storage.entries(&partition).await.unwrap() {
            assert_ne!(entry.key, url("/api/contact"));
            assert_ne!(entry.key, "https://cdn.example.net/lib.js");
        }
    }
}

#[tokio::test]
async fn offline_navigation_serves_shell() {
    let fetcher = MockFetcher::with(&[("/", "<html>shell</html>")]);
    let reg = registration(fetcher.clone(), Arc::new(MemoryStorage::new()), &["/"]);
    reg.register("/sw.js?v=5").await.unwrap();

    fetcher.set_offline(true);
    let served = reg.dispatch(&Request::navigate(url("/blog/launch"))).await.unwrap();

    assert_eq!(served.source, ResponseSource::ShellFallback);
    assert!(served.response.is_ok());
    assert_eq!(served.response.text(), "<html>shell</html>");
}

#[tokio::test]
async fn offline_other_request_without_cache_fails() {
    let fetcher = MockFetcher::with(&[("/", "shell")]);
    let reg = registration(fetcher.clone(), Arc::new(MemoryStorage::new()), &["/"]);
    reg.register("/sw.js").await.unwrap();

    fetcher.set_offline(true);
    let err = reg.dispatch(&Request::get(url("/api/quotes"))).await.unwrap_err();
    assert!(matches!(err, SwcacheError::Network { .. }));
}

#[tokio::test]
async fn end_to_end_offline_flow() {
    let fetcher = MockFetcher::with(&[
        ("/", "<html>home</html>"),
        ("/icons/icon-192.png", "png-192"),
        ("/app.abc123.js", "console.log(1)"),
    ]);
    let reg = registration(
        fetcher.clone(),
        Arc::new(MemoryStorage::new()),
        &["/", "/icons/icon-192.png"],
    );

    let outcome = reg.register("/sw.js?v=8").await.unwrap();
    assert_eq!(outcome.install.cached, 2);
    assert_eq!(reg.active_state().await, Some(ControllerState::Activated));

    // Root document while offline
    fetcher.set_offline(true);
    let home = reg.dispatch(&Request::navigate(url("/"))).await.unwrap();
    assert_eq!(home.response.text(), "<html>home</html>");
    fetcher.set_offline(false);

    // Precached icon is a cache hit with no network call
    let calls = fetcher.total_calls();
    let icon = reg.dispatch(&Request::get(url("/icons/icon-192.png"))).await.unwrap();
    assert_eq!(icon.source, ResponseSource::Cache);
    assert_eq!(icon.response.text(), "png-192");
    assert_eq!(fetcher.total_calls(), calls);

    // Runtime bundle goes to the network once, then survives going offline
    let online = reg.dispatch(&Request::get(url("/app.abc123.js"))).await.unwrap();
    assert_eq!(online.source, ResponseSource::Network);

    fetcher.set_offline(true);
    let offline = reg.dispatch(&Request::get(url("/app.abc123.js"))).await.unwrap();
    assert_eq!(offline.source, ResponseSource::Cache);
    assert_eq!(offline.response.text(), "console.log(1)");
}
