//! sw_fetch tool implementation.
//!
//! Delivers a fetch event for one request and returns the single response,
//! tagged with where it came from.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::worker::ResponseSource;
use swcache_core::{Error, Request};

use super::{ResponseView, json_result};
use crate::registration::Registration;

/// Input parameters for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL of the intercepted request.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// "cache" or "network".
    pub source: ResponseSource,
    pub response: ResponseView,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(registration: &Registration, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let request = Request::from_parts(&params.method, &params.url, params.headers).map_err(Error::from)?;
    let outcome = registration.fetch(&request).await?;

    json_result(&SwFetchOutput { source: outcome.source, response: ResponseView::from(&outcome.response) })
}
