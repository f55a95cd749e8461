//! Fetch handler: cache first, network on miss.
//!
//! A hit is returned verbatim with no freshness check. A miss goes to the
//! network exactly once and the result is never written back.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::CacheDb;
use crate::message::{Request, Response};
use crate::network::Network;

/// Where a fetch response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
}

/// The single response produced for an intercepted request.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub source: ResponseSource,
    pub response: Response,
}

/// Run the fetch event for one intercepted request.
///
/// Lookup spans every cache in the storage partition, oldest first.
///
/// # Errors
///
/// A network failure on a miss propagates unchanged; there is no offline
/// fallback.
pub async fn handle_fetch(db: &CacheDb, network: &dyn Network, request: &Request) -> Result<FetchOutcome, Error> {
    if let Some(response) = db.match_any(request).await? {
        tracing::debug!(method = %request.method, url = %request.url, "cache hit");
        return Ok(FetchOutcome { source: ResponseSource::Cache, response });
    }

    tracing::debug!(method = %request.method, url = %request.url, "cache miss, going to network");
    let response = network.fetch(request).await?;
    Ok(FetchOutcome { source: ResponseSource::Network, response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::FakeNetwork;
    use crate::worker::{WorkerConfig, install};
    use bytes::Bytes;
    use url::Url;

    fn get(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    async fn installed(db: &CacheDb) {
        let network = FakeNetwork::new().page("http://localhost:8000/", "<html>cached</html>");
        let config = WorkerConfig::new("v1", vec!["/".into()], Url::parse("http://localhost:8000/").unwrap());
        install(&config, db, &network).await.unwrap();
    }

    #[tokio::test]
    async fn test_hit_skips_network() {
        let db = CacheDb::open_in_memory().await.unwrap();
        installed(&db).await;
        let network = FakeNetwork::new().page("http://localhost:8000/", "<html>fresh</html>");

        let outcome = handle_fetch(&db, &network, &get("http://localhost:8000/")).await.unwrap();

        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(outcome.response.body, Bytes::from_static(b"<html>cached</html>"));
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_hit_ignores_fragment() {
        let db = CacheDb::open_in_memory().await.unwrap();
        installed(&db).await;
        let network = FakeNetwork::new();

        let request = Request::from_parts("GET", "http://localhost:8000/#pricing", Vec::new()).unwrap();
        let outcome = handle_fetch(&db, &network, &request).await.unwrap();

        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_passes_through_once() {
        let db = CacheDb::open_in_memory().await.unwrap();
        installed(&db).await;
        let network = FakeNetwork::new().status("http://localhost:8000/api/quotes", 503, "busy");

        let outcome = handle_fetch(&db, &network, &get("http://localhost:8000/api/quotes")).await.unwrap();

        assert_eq!(outcome.source, ResponseSource::Network);
        assert_eq!(outcome.response.status, 503);
        assert_eq!(outcome.response.body, Bytes::from_static(b"busy"));
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_not_written_back() {
        let db = CacheDb::open_in_memory().await.unwrap();
        installed(&db).await;
        let network = FakeNetwork::new().page("http://localhost:8000/about", "about");

        handle_fetch(&db, &network, &get("http://localhost:8000/about")).await.unwrap();
        handle_fetch(&db, &network, &get("http://localhost:8000/about")).await.unwrap();

        assert_eq!(network.calls(), 2);
        assert_eq!(db.entry_urls("v1").await.unwrap().unwrap(), vec!["http://localhost:8000/"]);
    }

    #[tokio::test]
    async fn test_post_bypasses_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        installed(&db).await;
        let network = FakeNetwork::new().page("http://localhost:8000/", "posted");

        let request = Request::from_parts("POST", "http://localhost:8000/", Vec::new()).unwrap();
        let outcome = handle_fetch(&db, &network, &request).await.unwrap();

        assert_eq!(outcome.source, ResponseSource::Network);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = FakeNetwork::new().unreachable("http://localhost:8000/live");

        let result = handle_fetch(&db, &network, &get("http://localhost:8000/live")).await;

        assert!(matches!(result, Err(Error::Network(_))));
    }
}
