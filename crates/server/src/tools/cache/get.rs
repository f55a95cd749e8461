//! cache_get tool implementation.
//!
//! Looks up one URL in one named cache, without touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CacheDb, Error, Request};

use crate::tools::{ResponseView, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The cache to search.
    pub cache_name: String,
    /// Absolute URL of the stored request.
    pub url: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub cache_name: String,
    pub response: ResponseView,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let request = Request::from_parts("GET", &params.url, Vec::new()).map_err(Error::from)?;
    let response = cache
        .match_entry(&params.cache_name, &request)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} not in {}", request.url, params.cache_name)))?;

    json_result(&CacheGetOutput { cache_name: params.cache_name, response: ResponseView::from(&response) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeNetwork, output, registration, worker};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheGetParams { cache_name: "v1".into(), url: "http://localhost:8000/".into() };

        let err = get_impl(&cache, params).await.unwrap_err();

        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let (registration, _) = registration(FakeNetwork::new().page("http://localhost:8000/", "home")).await;
        registration.register(worker("v1", &["/"])).await.unwrap();

        let params = CacheGetParams { cache_name: "v1".into(), url: "http://localhost:8000/".into() };
        let out: CacheGetOutput = output(&get_impl(registration.db(), params).await.unwrap());

        assert_eq!(out.cache_name, "v1");
        assert_eq!(out.response.body, "home");
        assert_eq!(out.response.headers.get("content-type").map(String::as_str), Some("text/html; charset=utf-8"));
    }
}
