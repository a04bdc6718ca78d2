//! HTTP fetcher backed by a blocking `ureq` agent

use super::Fetcher;
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Method, Request, Response};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use ureq::{Agent, RequestBuilder};

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("swcache/", env!("CARGO_PKG_VERSION"));

/// Fetcher that performs real HTTP requests
///
/// Each request runs on the blocking thread pool. Status codes are never
/// turned into errors; redirects are followed by the agent.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with a global per-request timeout
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();

        Self {
            agent: Agent::new_with_config(config),
            user_agent: user_agent.into(),
        }
    }

    fn execute(agent: &Agent, request: &Request, user_agent: &str) -> SwcacheResult<Response> {
        let url = request.url.as_str();
        let result = match request.method {
            Method::GET => with_headers(agent.get(url), request, user_agent).call(),
            Method::HEAD => with_headers(agent.head(url), request, user_agent).call(),
            Method::DELETE => with_headers(agent.delete(url), request, user_agent).call(),
            Method::OPTIONS => with_headers(agent.options(url), request, user_agent).call(),
            Method::POST => with_headers(agent.post(url), request, user_agent).send_empty(),
            Method::PUT => with_headers(agent.put(url), request, user_agent).send_empty(),
            Method::PATCH => with_headers(agent.patch(url), request, user_agent).send_empty(),
            ref other => {
                return Err(SwcacheError::User(format!(
                    "Unsupported request method: {}",
                    other
                )))
            }
        };

        let mut response = result.map_err(|e| SwcacheError::network(url, e.to_string()))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| SwcacheError::network(url, format!("reading body: {}", e)))?;

        Ok(Response {
            status,
            headers,
            body: body.into(),
            url: url.to_string(),
        })
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    request: &Request,
    user_agent: &str,
) -> RequestBuilder<B> {
    builder = builder.header("user-agent", user_agent);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let owned = request.clone();

        debug!("{} {}", owned.method, owned.url);
        tokio::task::spawn_blocking(move || Self::execute(&agent, &owned, &user_agent))
            .await
            .map_err(|e| SwcacheError::Internal(format!("Fetch task failed: {}", e)))?
    }

    fn fetcher_name(&self) -> &'static str {
        "http"
    }
}
