//! The network seam.
//!
//! Lifecycle handlers never talk to a concrete HTTP client; they are handed a
//! `Network` so the decision logic can run against an in-process fake.

use async_trait::async_trait;

use crate::Error;
use crate::message::{Request, Response};

/// Something that can perform a network fetch.
///
/// Any HTTP status is a successful fetch. Only transport failures
/// (`Error::Network`, `Error::FetchTimeout`) are errors.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
