//! sw_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use super::json_result;
use crate::registration::Registration;

/// Implementation of the sw_status tool.
pub async fn status_impl(registration: &Registration) -> Result<CallToolResult, McpError> {
    json_result(&registration.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{RegistrationStatus, WorkerState};
    use crate::test_support::{FakeNetwork, output, registration, worker};

    #[tokio::test]
    async fn test_status_after_start() {
        let (registration, _) = registration(FakeNetwork::new().page("http://localhost:8000/", "home")).await;
        registration.start(worker("v1", &["/"])).await.unwrap();

        let status: RegistrationStatus = output(&status_impl(&registration).await.unwrap());

        let active = status.active.unwrap();
        assert_eq!(active.cache_name, "v1");
        assert_eq!(active.state, WorkerState::Activated);
        assert!(status.installing.is_none());
        assert!(status.waiting.is_none());
        assert!(status.redundant.is_none());
    }
}
