//! HTTP network client.
//!
//! ### Request handling
//! - Method, URL and headers are forwarded unmodified
//! - Redirects followed up to 20 hops (browser parity)
//! - gzip / brotli / deflate bodies are decoded transparently
//!
//! ### Errors
//! - Any HTTP status is a successful fetch; callers decide what a 404 means
//! - A request reqwest refuses to build (bad header name or value) maps to
//!   `INVALID_INPUT`
//! - Transport failures map to `NETWORK_ERROR`
//! - An elapsed timeout maps to `FETCH_TIMEOUT` (no timeout unless configured)

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

use swcache_core::message::{Headers, append};
use swcache_core::{AppConfig, Error, Network, Request, Response};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Request timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 20)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "swcache/0.1".to_string(), timeout: None, max_redirects: 20 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// reqwest-backed implementation of [`Network`].
pub struct FetchClient {
    http: Client,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

fn transport_error(url: &url::Url, err: reqwest::Error) -> Error {
    if err.is_builder() {
        Error::InvalidInput(format!("{url}: {err}"))
    } else if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::Network(format!("{url}: {err}"))
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| transport_error(&request.url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            append(&mut headers, name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }

        let body = response.bytes().await.map_err(|e| transport_error(&request.url, e))?;

        tracing::debug!(
            "fetched {} {} -> {} ({}) in {}ms ({} bytes)",
            request.method,
            request.url,
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response {
            url: final_url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}
