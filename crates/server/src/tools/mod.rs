//! MCP tool implementations.
//!
//! Lifecycle tools deliver install / activate / fetch events to the
//! registration; cache tools inspect and manage the storage partition.

pub mod activate;
pub mod cache;
pub mod fetch;
pub mod install;
pub mod status;

use std::collections::BTreeMap;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Error, Response};

pub use activate::activate_impl;
pub use fetch::{SwFetchParams, fetch_impl};
pub use install::{SwInstallParams, install_impl};
pub use status::status_impl;

/// A response rendered for tool output.
///
/// Bodies are decoded as UTF-8 with replacement; `body_bytes` carries the
/// exact stored length.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    /// Final URL of the response.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub body_bytes: usize,
}

impl From<&Response> for ResponseView {
    fn from(response: &Response) -> Self {
        Self {
            url: response.url.to_string(),
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            body: String::from_utf8_lossy(&response.body).to_string(),
            body_bytes: response.body.len(),
        }
    }
}

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
