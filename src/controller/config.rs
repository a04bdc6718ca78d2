//! Controller configuration
//!
//! Everything the controller derives at startup lives in one immutable
//! `ControllerConfig`, so several controllers with different versions can
//! run side by side in one process.

use crate::error::{SwcacheError, SwcacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::{Origin, Url};

/// Cache version tag, read from the `v` query parameter of the
/// registration URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheVersion(String);

impl CacheVersion {
    /// Version used when the registration URL carries none
    pub const DEFAULT: &'static str = "2";

    /// Create a version tag. Blank input falls back to the default.
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        let trimmed = version.trim();
        if trimmed.is_empty() {
            Self(Self::DEFAULT.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Read `v` from a registration URL such as `/sw.js?v=7`
    ///
    /// Relative URLs are accepted. An unparseable URL, a missing `v`, or an
    /// empty `v` all give the default version.
    pub fn from_registration_url(registration_url: &str) -> Self {
        let parsed = Url::parse(registration_url).or_else(|_| {
            Url::parse("http://localhost/").and_then(|base| base.join(registration_url))
        });

        let version = parsed.ok().and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        });

        Self::new(version.unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CacheVersion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Paths fetched and stored during install, in order
///
/// Must match the files the site build emits: one missing file fails the
/// whole install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrecacheManifest(Vec<String>);

impl PrecacheManifest {
    pub fn new(paths: Vec<String>) -> Self {
        Self(paths)
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve every path against the origin
    pub fn resolve(&self, base: &Url) -> SwcacheResult<Vec<String>> {
        self.0
            .iter()
            .map(|path| {
                base.join(path)
                    .map(|url| url.to_string())
                    .map_err(|e| SwcacheError::InvalidUrl {
                        url: path.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }
}

impl Default for PrecacheManifest {
    fn default() -> Self {
        let paths = [
            "/",
            "/about",
            "/pricing",
            "/solutions",
            "/contact",
            "/blog",
            "/sitemap.xml",
            "/robots.txt",
            "/brand/wordmark.svg",
            "/images/hero.webp",
            "/images/deal-room.webp",
            "/images/valuation.webp",
            "/icons/icon-192.png",
            "/icons/icon-512.png",
            "/apple-touch-icon.png",
            "/favicon.ico",
        ];
        Self(paths.iter().map(|p| p.to_string()).collect())
    }
}

/// Immutable configuration of one controller instance
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    base: Url,
    origin: Origin,
    version: CacheVersion,
    static_cache: String,
    runtime_cache: String,
    precache: PrecacheManifest,
}

impl ControllerConfig {
    /// Build the configuration for `origin` at `version`
    ///
    /// The origin must be an http or https URL; any path on it is ignored.
    pub fn new(
        origin: &str,
        version: CacheVersion,
        precache: PrecacheManifest,
    ) -> SwcacheResult<Self> {
        let parsed = Url::parse(origin).map_err(|e| SwcacheError::InvalidUrl {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SwcacheError::InvalidUrl {
                url: origin.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let base = parsed.join("/").map_err(|e| SwcacheError::InvalidUrl {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            origin: base.origin(),
            base,
            static_cache: format!("static-{}", version),
            runtime_cache: format!("runtime-{}", version),
            version,
            precache,
        })
    }

    /// Build the configuration from the registration URL's `v` parameter
    pub fn from_registration(
        origin: &str,
        registration_url: &str,
        precache: PrecacheManifest,
    ) -> SwcacheResult<Self> {
        Self::new(
            origin,
            CacheVersion::from_registration_url(registration_url),
            precache,
        )
    }

    /// Origin root URL, e.g. `https://example.com/`
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    /// Name of the partition holding precached and static assets
    pub fn static_cache(&self) -> &str {
        &self.static_cache
    }

    /// Name of the partition holding runtime responses
    pub fn runtime_cache(&self) -> &str {
        &self.runtime_cache
    }

    pub fn precache(&self) -> &PrecacheManifest {
        &self.precache
    }

    /// Cache key of the root document
    pub fn root_document(&self) -> String {
        self.base.to_string()
    }

    /// Whether a partition name belongs to this version
    pub fn owns_partition(&self, name: &str) -> bool {
        name == self.static_cache || name == self.runtime_cache
    }
}
