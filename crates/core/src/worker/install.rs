//! Install handler: pre-populate the worker's cache.
//!
//! Population is all-or-nothing. Every allow-list URL is fetched
//! concurrently; the first transport failure, non-2xx status or unstorable
//! response fails the whole install and nothing is written.

use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::WorkerConfig;
use crate::Error;
use crate::cache::{CacheDb, check_storable};
use crate::message::{Request, Response};
use crate::network::Network;

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub cache_name: String,
    /// Resolved URLs now stored, in allow-list order.
    pub cached: Vec<String>,
}

/// Run the install event for a worker version.
///
/// # Errors
///
/// Any error means the version must not be activated. A configuration that
/// does not resolve is rejected before any cache is opened; after a fetch
/// failure the named cache may exist but holds none of this batch.
pub async fn install(config: &WorkerConfig, db: &CacheDb, network: &dyn Network) -> Result<InstallReport, Error> {
    tracing::info!(cache_name = %config.cache_name, urls = config.precache_urls.len(), "installing");

    let requests = config.precache_requests()?;

    db.open_cache(&config.cache_name).await?;
    tracing::info!(cache_name = %config.cache_name, "cache opened");

    let responses = try_join_all(requests.iter().map(|request| fetch_for_cache(network, request))).await?;

    let cached: Vec<String> = requests.iter().map(|r| r.url.to_string()).collect();
    let entries: Vec<(Request, Response)> = requests.into_iter().zip(responses).collect();
    db.put_entries(&config.cache_name, entries).await?;

    tracing::info!(cache_name = %config.cache_name, entries = cached.len(), "cache opened and populated");

    Ok(InstallReport { cache_name: config.cache_name.clone(), cached })
}

async fn fetch_for_cache(network: &dyn Network, request: &Request) -> Result<Response, Error> {
    let response = network.fetch(request).await.inspect_err(|e| {
        tracing::warn!(url = %request.url, error = %e, "pre-cache fetch failed");
    })?;

    if !response.ok() {
        return Err(Error::HttpError(format!("{} returned status {}", request.url, response.status)));
    }

    check_storable(request, &response)?;
    Ok(response)
}
