//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::AppConfig;
use crate::resolve::resolve;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name` or `user_agent` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - a `precache_urls` entry does not resolve, or two entries resolve
    ///   to the same URL
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        let origin = self.origin_url()?;

        let mut seen = HashSet::new();
        for entry in &self.precache_urls {
            let url = resolve(&origin, entry).map_err(|e| ConfigError::Invalid {
                field: "precache_urls".into(),
                reason: format!("{entry:?}: {e}"),
            })?;
            if !seen.insert(url.to_string()) {
                return Err(ConfigError::Invalid {
                    field: "precache_urls".into(),
                    reason: format!("duplicate entry {url}"),
                });
            }
        }

        if self.precache_urls.is_empty() {
            tracing::warn!(cache_name = %self.cache_name, "precache_urls is empty; install will cache nothing");
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        Ok(())
    }
}
