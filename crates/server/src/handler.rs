//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to
//! lifecycle events on the registration and to cache maintenance tools.
use std::sync::Arc;

use crate::registration::Registration;
use crate::tools::cache::{CacheDeleteParams, CacheGetParams, CacheKeysParams, delete_impl, get_impl, keys_impl};
use crate::tools::{SwFetchParams, SwInstallParams, activate_impl, fetch_impl, install_impl, status_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use swcache_core::WorkerConfig;

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    tool_router: ToolRouter<Self>,
    registration: Arc<Registration>,
    defaults: WorkerConfig,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwCacheServer {
    /// Create a new server handler.
    ///
    /// `defaults` is the configured worker version, used when `sw_install`
    /// is called without overrides.
    pub fn new(registration: Arc<Registration>, defaults: WorkerConfig) -> Self {
        Self { tool_router: Self::tool_router(), registration, defaults }
    }

    #[tool(description = "Register a worker version and pre-cache its URL allow-list. \
        All-or-nothing: any failed fetch fails the install and keeps the current version. \
        On success the version waits for sw_activate.")]
    async fn sw_install(&self, params: Parameters<SwInstallParams>) -> Result<CallToolResult, McpError> {
        install_impl(&self.registration, &self.defaults, params.0).await
    }

    #[tool(description = "Activate the waiting worker version and delete every cache except its own.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.registration).await
    }

    #[tool(description = "Deliver a fetch event. Returns the cached response if one matches, \
        otherwise the network response (never written back to the cache).")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.registration, params.0).await
    }

    #[tool(description = "Show the installing, waiting, active and last redundant worker versions.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.registration).await
    }

    #[tool(description = "List cache names, or the request URLs stored in one cache.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(self.registration.db(), params.0).await
    }

    #[tool(description = "Look up a URL in one named cache without touching the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.registration.db(), params.0).await
    }

    #[tool(description = "Delete a named cache and all of its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(self.registration.db(), params.0).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeNetwork, registration, worker};

    #[tokio::test]
    async fn test_all_tools_routed() {
        let (registration, _) = registration(FakeNetwork::new()).await;
        let server = SwCacheServer::new(registration, worker("v1", &["/"]));

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec!["cache_delete", "cache_get", "cache_keys", "sw_activate", "sw_fetch", "sw_install", "sw_status"]
        );
    }
}
