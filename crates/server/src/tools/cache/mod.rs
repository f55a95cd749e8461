//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and managing the cache storage.

pub mod delete;
pub mod get;
pub mod keys;

pub use delete::{CacheDeleteParams, delete_impl};
pub use get::{CacheGetParams, get_impl};
pub use keys::{CacheKeysParams, keys_impl};
