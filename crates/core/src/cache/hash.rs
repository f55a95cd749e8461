//! Request key generation.

use sha2::{Digest, Sha256};

/// Compute the lookup key for a request identity.
///
/// Vary-dependent headers are not part of the key; candidates sharing a key
/// are filtered against the stored Vary values after lookup.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
