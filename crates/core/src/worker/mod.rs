//! Lifecycle handlers for a cached worker version.
//!
//! Each handler is a plain async function of the worker configuration, the
//! cache storage handle, and (where needed) the network. None of them keep
//! state between calls; sequencing the events is the host's job.

pub mod activate;
pub mod fetch;
pub mod install;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::message::Request;
use crate::resolve::resolve;

pub use activate::{ActivateReport, activate};
pub use fetch::{FetchOutcome, ResponseSource, handle_fetch};
pub use install::{InstallReport, install};

/// One worker version: the cache it owns and what it pre-caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub cache_name: String,
    /// Allow-list entries, relative to `origin` or absolute. Order is fetch
    /// order only.
    pub precache_urls: Vec<String>,
    pub origin: Url,
}

impl WorkerConfig {
    pub fn new(cache_name: impl Into<String>, precache_urls: Vec<String>, origin: Url) -> Self {
        Self { cache_name: cache_name.into(), precache_urls, origin }
    }

    /// Resolve the allow-list into `GET` requests.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty cache name, `InvalidUrl` for an entry
    /// that does not resolve, `InvalidState` when two entries name the same
    /// request.
    pub fn precache_requests(&self) -> Result<Vec<Request>, Error> {
        if self.cache_name.trim().is_empty() {
            return Err(Error::InvalidInput("cache name cannot be empty".into()));
        }

        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(self.precache_urls.len());
        for entry in &self.precache_urls {
            let url = resolve(&self.origin, entry)?;
            if !seen.insert(url.clone()) {
                return Err(Error::InvalidState(format!("duplicate request in pre-cache list: {url}")));
            }
            requests.push(Request::get(url));
        }
        Ok(requests)
    }
}

/// Test doubles for the `Network` seam, shared with dependent crates
/// through the `test-support` feature.
#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use url::Url;

    use crate::Error;
    use crate::message::{Headers, Request, Response, append};
    use crate::network::Network;

    /// Network stand-in with canned routes and a call counter.
    ///
    /// Unknown URLs answer 404; URLs marked unreachable fail at transport level.
    #[derive(Default)]
    pub struct FakeNetwork {
        routes: HashMap<String, Response>,
        unreachable: HashSet<String>,
        calls: AtomicUsize,
    }

    impl FakeNetwork {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(self, url: &str, body: &str) -> Self {
            self.status(url, 200, body)
        }

        pub fn status(mut self, url: &str, status: u16, body: &str) -> Self {
            let mut headers = Headers::new();
            append(&mut headers, "content-type", "text/html; charset=utf-8");
            let response = Response {
                url: Url::parse(url).unwrap(),
                status,
                status_text: if status == 200 { "OK".into() } else { String::new() },
                headers,
                body: Bytes::from(body.to_string()),
            };
            self.routes.insert(url.to_string(), response);
            self
        }

        pub fn unreachable(mut self, url: &str) -> Self {
            self.unreachable.insert(url.to_string());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Network for FakeNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let url = request.url.as_str();
            if self.unreachable.contains(url) {
                return Err(Error::Network(format!("connection refused: {url}")));
            }
            Ok(self.routes.get(url).cloned().unwrap_or_else(|| Response {
                url: request.url.clone(),
                status: 404,
                status_text: "Not Found".into(),
                headers: Headers::new(),
                body: Bytes::new(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(urls: &[&str]) -> WorkerConfig {
        WorkerConfig::new(
            "v1",
            urls.iter().map(|u| u.to_string()).collect(),
            Url::parse("http://localhost:8000/").unwrap(),
        )
    }

    #[test]
    fn test_precache_requests_resolve_in_order() {
        let requests = config(&["/", "/app.js", "https://cdn.example.com/lib.css"]).precache_requests().unwrap();
        let urls: Vec<&str> = requests.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://localhost:8000/", "http://localhost:8000/app.js", "https://cdn.example.com/lib.css"]);
        assert!(requests.iter().all(Request::is_get));
    }

    #[test]
    fn test_precache_requests_duplicate() {
        let result = config(&["/index.html", "/index.html#main"]).precache_requests();
        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_precache_requests_empty_name() {
        let mut worker = config(&["/"]);
        worker.cache_name = String::new();
        assert!(matches!(worker.precache_requests(), Err(Error::InvalidInput(_))));
    }
}
