//! Request and response values passed between the host, the controller,
//! the fetcher and cache storage.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

pub use ureq::http::Method;

/// Fetch mode of an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level page load or client-side route transition
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigate => "navigate",
            Self::SameOrigin => "same-origin",
            Self::NoCors => "no-cors",
            Self::Cors => "cors",
        };
        write!(f, "{}", name)
    }
}

/// An intercepted request
///
/// The URL is kept as the raw string the page asked for; whether it parses
/// is a routing decision, not a construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub mode: RequestMode,
    pub headers: BTreeMap<String, String>,
}

impl Request {
    /// Create a request with an explicit method
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            mode: RequestMode::default(),
            headers: BTreeMap::new(),
        }
    }

    /// Create a subresource GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a navigation GET request
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::get(url).with_mode(RequestMode::Navigate)
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Parsed URL, if the raw string is a valid absolute URL
    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.url).ok()
    }

    /// Key used to store this request in a partition
    ///
    /// Matches on the full URL including query, never on the fragment.
    pub fn cache_key(&self) -> Option<String> {
        let mut url = self.parsed_url()?;
        url.set_fragment(None);
        Some(url.to_string())
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response from the network or from cache storage
///
/// Cloning shares the body buffer, so storing a clone and returning the
/// original costs one reference count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
    /// Final URL the response was produced for
    pub url: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
            url: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Status in the 200-299 range
    pub fn is_ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Whether cache storage accepts this response
    ///
    /// Partial content is rejected, everything else (error statuses
    /// included) is stored as-is.
    pub fn is_cacheable(&self) -> bool {
        self.status != 206
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Body decoded as UTF-8, lossy
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_strips_fragment_keeps_query() {
        let req = Request::get("https://example.com/pricing?plan=pro#faq");
        assert_eq!(
            req.cache_key().as_deref(),
            Some("https://example.com/pricing?plan=pro")
        );
    }

    #[test]
    fn cache_key_unparseable_is_none() {
        assert!(Request::get("not a url").cache_key().is_none());
    }

    #[test]
    fn navigate_sets_mode() {
        let req = Request::navigate("https://example.com/");
        assert!(req.is_navigation());
        assert_eq!(req.method, Method::GET);
        assert!(!Request::get("https://example.com/").is_navigation());
    }

    #[test]
    fn headers_are_lowercased() {
        let res = Response::new(200, "hi").with_header("Content-Type", "text/html");
        assert_eq!(res.content_type(), Some("text/html"));
    }

    #[test]
    fn partial_content_not_cacheable() {
        assert!(!Response::new(206, "").is_cacheable());
        assert!(Response::new(404, "").is_cacheable());
        assert!(!Response::new(404, "").is_ok());
    }
}
