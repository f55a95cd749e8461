//! sw_install tool implementation.
//!
//! Registers a worker version and runs its install event. Cache name and
//! allow-list default to the server configuration and can be overridden per
//! call to stage a new version.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::WorkerConfig;

use super::json_result;
use crate::registration::{Registration, WorkerState};

/// Input parameters for sw_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallParams {
    /// Cache name for the new version (default: configured cache_name).
    #[serde(default)]
    pub cache_name: Option<String>,

    /// URLs to pre-cache, relative to the origin or absolute
    /// (default: configured precache_urls).
    #[serde(default)]
    pub precache_urls: Option<Vec<String>>,
}

/// Output structure for sw_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwInstallOutput {
    pub cache_name: String,
    /// Resolved URLs stored by this install.
    pub cached: Vec<String>,
    /// State of the new version after install.
    pub state: WorkerState,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(
    registration: &Registration, defaults: &WorkerConfig, params: SwInstallParams,
) -> Result<CallToolResult, McpError> {
    let config = WorkerConfig {
        cache_name: params.cache_name.unwrap_or_else(|| defaults.cache_name.clone()),
        precache_urls: params.precache_urls.unwrap_or_else(|| defaults.precache_urls.clone()),
        origin: defaults.origin.clone(),
    };

    let report = registration.register(config).await?;

    json_result(&SwInstallOutput { cache_name: report.cache_name, cached: report.cached, state: WorkerState::Installed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeNetwork, output, registration, worker};

    #[tokio::test]
    async fn test_install_defaults() {
        let (registration, _) = registration(FakeNetwork::new().page("http://localhost:8000/", "home")).await;

        let result = install_impl(&registration, &worker("site-v1", &["/"]), SwInstallParams::default())
            .await
            .unwrap();

        let out: SwInstallOutput = output(&result);
        assert_eq!(out.cache_name, "site-v1");
        assert_eq!(out.cached, vec!["http://localhost:8000/"]);
        assert_eq!(out.state, WorkerState::Installed);
    }

    #[tokio::test]
    async fn test_install_overrides() {
        let network = FakeNetwork::new()
            .page("http://localhost:8000/", "home")
            .page("http://localhost:8000/docs", "docs");
        let (registration, _) = registration(network).await;
        let params = SwInstallParams {
            cache_name: Some("docs-v2".into()),
            precache_urls: Some(vec!["/docs".into()]),
        };

        let result = install_impl(&registration, &worker("site-v1", &["/"]), params).await.unwrap();

        let out: SwInstallOutput = output(&result);
        assert_eq!(out.cache_name, "docs-v2");
        assert_eq!(out.cached, vec!["http://localhost:8000/docs"]);
        assert_eq!(registration.status().await.waiting.unwrap().cache_name, "docs-v2");
    }

    #[tokio::test]
    async fn test_install_failure_is_tool_error() {
        let network = FakeNetwork::new().unreachable("http://localhost:8000/");
        let (registration, _) = registration(network).await;

        let result = install_impl(&registration, &worker("site-v1", &["/"]), SwInstallParams::default()).await;

        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32005);
        assert!(registration.status().await.waiting.is_none());
    }
}
