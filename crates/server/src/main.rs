//! swcache MCP server entry point.
//!
//! Boots the registration for the configured worker version, then serves
//! lifecycle and cache tools on stdio transport. Logging goes to stderr to
//! avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchClient, FetchConfig};
use swcache_core::{AppConfig, CacheDb, Network};
use tracing_subscriber::EnvFilter;

mod handler;
mod registration;
mod tools;

#[cfg(test)]
mod test_support;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let worker = config.worker_config()?;

    tracing::info!(
        cache_name = %worker.cache_name,
        origin = %worker.origin,
        db_path = %config.db_path.display(),
        "Starting swcache server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let registration = Arc::new(registration::Registration::new(db, network));

    if let Err(e) = registration.start(worker.clone()).await {
        tracing::error!(error = %e, "initial registration failed; requests go to the network uncontrolled");
    }

    let handler = handler::SwCacheServer::new(registration, worker);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
