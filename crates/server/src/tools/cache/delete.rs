//! cache_delete tool implementation.
//!
//! Deletes a named cache and all of its entries.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Name of the cache to delete.
    pub cache_name: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    /// False if no cache had this name.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(cache: &CacheDb, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    if params.cache_name.is_empty() {
        return Err(Error::InvalidInput("cache_name cannot be empty".into()).into());
    }

    let deleted = cache.delete_cache(&params.cache_name).await?;
    if deleted {
        tracing::info!(cache_name = %params.cache_name, "cache deleted on request");
    }

    json_result(&CacheDeleteOutput { deleted })
}
