//! Core types and lifecycle logic for swcache.
//!
//! This crate provides:
//! - Cache storage with SQLite backend
//! - Request/response model and URL resolution
//! - The `Network` seam and the install / fetch / activate handlers
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod message;
pub mod network;
pub mod resolve;
pub mod worker;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use message::{Headers, Request, Response};
pub use network::Network;
pub use worker::WorkerConfig;
