//! sw_activate tool implementation.
//!
//! Activates the waiting worker version and purges obsolete caches.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;
use crate::registration::Registration;

/// Implementation of the sw_activate tool.
pub async fn activate_impl(registration: &Registration) -> Result<CallToolResult, McpError> {
    let report = registration.activate().await?;
    json_result(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeNetwork, output, registration, worker};
    use swcache_core::worker::ActivateReport;

    #[tokio::test]
    async fn test_activate_reports_deleted_caches() {
        let (registration, _) = registration(FakeNetwork::new().page("http://localhost:8000/", "home")).await;
        registration.start(worker("old-cache-v1", &["/"])).await.unwrap();
        registration.register(worker("new-cache-v2", &["/"])).await.unwrap();

        let result = activate_impl(&registration).await.unwrap();

        let report: ActivateReport = output(&result);
        assert_eq!(report.cache_name, "new-cache-v2");
        assert_eq!(report.deleted, vec!["old-cache-v1"]);
    }

    #[tokio::test]
    async fn test_activate_nothing_waiting() {
        let (registration, _) = registration(FakeNetwork::new()).await;

        let err = activate_impl(&registration).await.unwrap_err();

        assert_eq!(err.code.0, -32004);
    }
}
