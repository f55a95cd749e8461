//! cache_keys tool implementation.
//!
//! Lists cache names, or the request URLs stored in one cache.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// List the entries of this cache instead of the cache names.
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheKeysOutput {
    Caches { caches: Vec<String> },
    Entries { cache_name: String, urls: Vec<String> },
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let output = match params.cache_name {
        None => CacheKeysOutput::Caches { caches: cache.cache_names().await? },
        Some(cache_name) => {
            let urls = cache
                .entry_urls(&cache_name)
                .await?
                .ok_or_else(|| Error::CacheMiss(format!("no cache named {cache_name}")))?;
            CacheKeysOutput::Entries { cache_name, urls }
        }
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeNetwork, output, registration, worker};

    #[tokio::test]
    async fn test_keys_lists_caches() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.open_cache("v1").await.unwrap();
        cache.open_cache("v2").await.unwrap();

        let result = keys_impl(&cache, CacheKeysParams::default()).await.unwrap();

        let value: serde_json::Value = output(&result);
        assert_eq!(value["caches"], serde_json::json!(["v1", "v2"]));
    }

    #[tokio::test]
    async fn test_keys_lists_entries() {
        let network = FakeNetwork::new()
            .page("http://localhost:8000/", "home")
            .page("http://localhost:8000/app.js", "js");
        let (registration, _) = registration(network).await;
        registration.start(worker("v1", &["/", "/app.js"])).await.unwrap();

        let params = CacheKeysParams { cache_name: Some("v1".into()) };
        let result = keys_impl(registration.db(), params).await.unwrap();

        let value: serde_json::Value = output(&result);
        assert_eq!(value["cache_name"], "v1");
        assert_eq!(value["urls"], serde_json::json!(["http://localhost:8000/", "http://localhost:8000/app.js"]));
    }

    #[tokio::test]
    async fn test_keys_unknown_cache() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheKeysParams { cache_name: Some("nope".into()) };

        let err = keys_impl(&cache, params).await.unwrap_err();

        assert_eq!(err.code.0, -32001);
    }
}
