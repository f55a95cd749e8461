//! Activate handler: drop every cache except the current one.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use super::WorkerConfig;
use crate::Error;
use crate::cache::CacheDb;

/// Result of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateReport {
    /// The cache that survives.
    pub cache_name: String,
    /// Caches removed by this activation.
    pub deleted: Vec<String>,
}

/// Run the activate event for a worker version.
///
/// Deletions are issued together and all awaited. A failed deletion is
/// logged and skipped; it does not fail activation.
///
/// # Errors
///
/// Only if the cache names cannot be enumerated.
pub async fn activate(config: &WorkerConfig, db: &CacheDb) -> Result<ActivateReport, Error> {
    let names = db.cache_names().await?;
    let obsolete: Vec<String> = names.into_iter().filter(|name| *name != config.cache_name).collect();

    tracing::info!(cache_name = %config.cache_name, obsolete = obsolete.len(), "activating");

    let results = join_all(obsolete.iter().map(|name| async move { (name, db.delete_cache(name).await) })).await;

    let mut deleted = Vec::with_capacity(results.len());
    for (name, result) in results {
        match result {
            Ok(true) => {
                tracing::info!(cache_name = %name, "deleted obsolete cache");
                deleted.push(name.clone());
            }
            Ok(false) => tracing::debug!(cache_name = %name, "obsolete cache already gone"),
            Err(e) => tracing::warn!(cache_name = %name, error = %e, "failed to delete obsolete cache"),
        }
    }

    Ok(ActivateReport { cache_name: config.cache_name.clone(), deleted })
}
