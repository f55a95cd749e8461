//! Shared fixtures for tool and registration tests.

use std::sync::Arc;

use rmcp::model::CallToolResult;
use swcache_core::{CacheDb, WorkerConfig};
use url::Url;

use crate::registration::Registration;

pub use swcache_core::worker::testing::FakeNetwork;

pub const ORIGIN: &str = "http://localhost:8000/";

pub fn worker(cache_name: &str, urls: &[&str]) -> WorkerConfig {
    WorkerConfig::new(cache_name, urls.iter().map(|u| u.to_string()).collect(), Url::parse(ORIGIN).unwrap())
}

/// Registration over an in-memory database.
pub async fn registration(network: FakeNetwork) -> (Arc<Registration>, Arc<FakeNetwork>) {
    let db = CacheDb::open_in_memory().await.unwrap();
    let network = Arc::new(network);
    (Arc::new(Registration::new(db, network.clone())), network)
}

/// Decode the JSON text payload of a tool result.
pub fn output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
