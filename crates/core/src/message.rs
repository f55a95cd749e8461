//! Request and response descriptors exchanged between the host, the cache
//! store, and the network.
//!
//! Header names are stored lower-cased; repeated headers are joined with
//! `", "` the way the Fetch `Headers` object exposes them.

use std::collections::BTreeMap;

use bytes::Bytes;
use url::Url;

use crate::resolve::{ResolveError, canonicalize};

/// Header map keyed by lower-cased header name.
pub type Headers = BTreeMap<String, String>;

/// An intercepted or pre-cache request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Canonical URL (no fragment).
    pub url: Url,
    pub headers: Headers,
}

impl Request {
    /// A bare `GET` for the given URL.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url, headers: Headers::new() }
    }

    /// Build a request from host-supplied parts.
    pub fn from_parts(method: &str, url: &str, headers: impl IntoIterator<Item = (String, String)>) -> Result<Self, ResolveError> {
        let url = canonicalize(url)?;
        let mut request = Self { method: method.trim().to_ascii_uppercase(), url, headers: Headers::new() };
        for (name, value) in headers {
            request.append_header(&name, &value);
        }
        Ok(request)
    }

    /// Add a header, joining with any existing value of the same name.
    pub fn append_header(&mut self, name: &str, value: &str) {
        append(&mut self.headers, name, value);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response, either stored in a cache or fresh from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: Url,
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    /// Whether the status is in the 200-299 range (`Response.ok`).
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Header names listed in `Vary`, lower-cased.
    ///
    /// `Vary: *` is returned as a single `"*"` entry.
    pub fn vary(&self) -> Vec<String> {
        self.header("vary")
            .map(|v| {
                v.split(',')
                    .map(|name| name.trim().to_ascii_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Add a header to a map, joining repeated names with `", "`.
pub fn append(headers: &mut Headers, name: &str, value: &str) {
    let name = name.trim().to_ascii_lowercase();
    headers
        .entry(name)
        .and_modify(|existing| {
            existing.push_str(", ");
            existing.push_str(value);
        })
        .or_insert_with(|| value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_vary(vary: &str) -> Response {
        let mut headers = Headers::new();
        append(&mut headers, "Vary", vary);
        Response {
            url: Url::parse("https://example.com/").unwrap(),
            status: 200,
            status_text: "OK".into(),
            headers,
            body: Bytes::new(),
        }
    }

    #[test]
    fn test_from_parts_normalizes() {
        let request = Request::from_parts(
            "get",
            "https://Example.com/a#frag",
            vec![("Accept".to_string(), "text/html".to_string())],
        )
        .unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.url.as_str(), "https://example.com/a");
        assert_eq!(request.header("accept"), Some("text/html"));
        assert_eq!(request.header("ACCEPT"), Some("text/html"));
    }

    #[test]
    fn test_repeated_headers_join() {
        let mut request = Request::get(Url::parse("https://example.com/").unwrap());
        request.append_header("Accept", "text/html");
        request.append_header("accept", "*/*");
        assert_eq!(request.header("accept"), Some("text/html, */*"));
    }

    #[test]
    fn test_vary_parsing() {
        assert_eq!(response_with_vary("Accept-Encoding, Origin").vary(), vec!["accept-encoding", "origin"]);
        assert_eq!(response_with_vary("*").vary(), vec!["*"]);
    }

    #[test]
    fn test_ok_range() {
        let mut response = response_with_vary("");
        assert!(response.ok());
        response.status = 304;
        assert!(!response.ok());
        response.status = 299;
        assert!(response.ok());
    }
}
