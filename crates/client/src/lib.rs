//! Network client for swcache.
//!
//! This crate provides the reqwest-backed `Network` implementation used by
//! the host adapter to deliver pre-cache and pass-through fetches.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
