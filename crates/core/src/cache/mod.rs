//! SQLite-backed cache storage.
//!
//! This module provides the persistent storage partition behind the cache
//! manager, using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Any number of named caches, ordered by creation
//! - Request/response entries matched by method, URL and `Vary`
//! - Transactional batch writes (all-or-nothing population)
//! - Cascading deletion of a cache with its entries
//! - Automatic schema migrations

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::check_storable;
