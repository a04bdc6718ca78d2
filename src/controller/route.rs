//! Request classification
//!
//! Each intercepted request is routed to exactly one strategy. Rules are
//! evaluated in order; the first match wins:
//!
//! 1. non-GET -> passthrough
//! 2. unparseable URL, non-http(s) scheme, or foreign origin -> passthrough
//! 3. navigation mode -> network-first, root document fallback
//! 4. static asset extension -> cache-first on the static partition
//! 5. anything else -> network-first on the runtime partition

use crate::http::{Method, Request};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Origin;

static STATIC_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(js|css|webp|png|svg|ico|woff2?)$").expect("static asset pattern")
});

/// Class of an intercepted same-origin GET request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Navigation,
    StaticAsset,
    Other,
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigation => write!(f, "navigation"),
            Self::StaticAsset => write!(f, "static-asset"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Why a request was left to the network untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    NotGet,
    InvalidUrl,
    UnsupportedScheme,
    CrossOrigin,
}

impl fmt::Display for PassthroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotGet => write!(f, "method is not GET"),
            Self::InvalidUrl => write!(f, "URL does not parse"),
            Self::UnsupportedScheme => write!(f, "scheme is not http(s)"),
            Self::CrossOrigin => write!(f, "cross-origin"),
        }
    }
}

/// Routing decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough(PassthroughReason),
    Intercept(RequestClass),
}

impl Route {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Self::Intercept(_))
    }

    pub fn class(&self) -> Option<RequestClass> {
        match self {
            Self::Intercept(class) => Some(*class),
            Self::Passthrough(_) => None,
        }
    }
}

/// Route a request for a controller serving `origin`
pub fn route(request: &Request, origin: &Origin) -> Route {
    if request.method != Method::GET {
        return Route::Passthrough(PassthroughReason::NotGet);
    }

    let Some(url) = request.parsed_url() else {
        return Route::Passthrough(PassthroughReason::InvalidUrl);
    };

    if !matches!(url.scheme(), "http" | "https") {
        return Route::Passthrough(PassthroughReason::UnsupportedScheme);
    }

    if &url.origin() != origin {
        return Route::Passthrough(PassthroughReason::CrossOrigin);
    }

    if request.is_navigation() {
        return Route::Intercept(RequestClass::Navigation);
    }

    if is_static_asset(url.path()) {
        return Route::Intercept(RequestClass::StaticAsset);
    }

    Route::Intercept(RequestClass::Other)
}

/// Whether a URL path ends in a static asset extension
pub fn is_static_asset(path: &str) -> bool {
    STATIC_ASSET.is_match(path)
}
