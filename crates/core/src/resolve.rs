//! URL resolution for allow-list entries and intercepted requests.
//!
//! Relative entries (`/`, `/app.js`) are resolved against the worker origin,
//! absolute entries are parsed as-is. Both end up in the same canonical form
//! so that install-time keys and fetch-time lookups agree.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute URL string.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an `http` or `https` scheme
/// 3. Lowercase the host (the parser already does this for special schemes)
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<Url, ResolveError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(ResolveError::Empty);
    }

    let parsed = Url::parse(trimmed).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
    finish(parsed)
}

/// Resolve an allow-list entry against the worker origin.
///
/// `"/"` against `http://localhost:8000/app/` yields `http://localhost:8000/`;
/// `"style.css"` yields `http://localhost:8000/app/style.css`.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, ResolveError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(ResolveError::Empty);
    }

    let joined = origin.join(trimmed).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;
    finish(joined)
}

fn finish(mut url: Url) -> Result<Url, ResolveError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(ResolveError::UnsupportedScheme(scheme.to_string())),
    }

    if url.host_str().is_none() {
        return Err(ResolveError::InvalidUrl(format!("missing host: {url}")));
    }

    url.set_fragment(None);

    Ok(url)
}

impl From<ResolveError> for crate::Error {
    fn from(err: ResolveError) -> Self {
        crate::Error::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_resolve_relative_to_scope() {
        let scope = Url::parse("http://localhost:8000/app/").unwrap();
        assert_eq!(resolve(&scope, "style.css").unwrap().as_str(), "http://localhost:8000/app/style.css");
        assert_eq!(resolve(&scope, "/").unwrap().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = resolve(&origin(), "https://cdn.example.com/lib.js").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/lib.js");
    }

    #[test]
    fn test_resolve_strips_fragment_keeps_query() {
        let url = resolve(&origin(), "/index.html?v=2#top").unwrap();
        assert_eq!(url.query(), Some("v=2"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_empty() {
        assert_eq!(resolve(&origin(), "  "), Err(ResolveError::Empty));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM/Path").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/Path");
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  https://example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(ResolveError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_relative_rejected() {
        let result = canonicalize("/index.html");
        assert!(matches!(result, Err(ResolveError::InvalidUrl(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert_eq!(canonicalize(""), Err(ResolveError::Empty));
    }
}
