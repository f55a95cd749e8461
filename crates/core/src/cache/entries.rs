//! Stored request/response pairs.
//!
//! Entries are written in batches inside a single transaction so a failed
//! batch leaves the cache untouched. Lookups follow Cache API matching: only
//! `GET` requests match, the URL must be equal (fragment already stripped),
//! and every header named by the stored response's `Vary` must carry the
//! same value on the incoming request as it did on the stored one.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::message::{Headers, Request, Response};
use bytes::Bytes;
use tokio_rusqlite::{params, rusqlite};
use url::Url;

/// Request header values captured for each name in the response's `Vary`.
type VaryValues = BTreeMap<String, Option<String>>;

/// Raw row as read from the entries table.
struct EntryRow {
    vary_json: String,
    response_url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            vary_json: row.get(0)?,
            response_url: row.get(1)?,
            status: row.get(2)?,
            status_text: row.get(3)?,
            headers_json: row.get(4)?,
            body: row.get(5)?,
        })
    }

    fn into_response(self) -> Result<Response, Error> {
        let url = Url::parse(&self.response_url).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        let headers: Headers = serde_json::from_str(&self.headers_json)?;
        Ok(Response { url, status: self.status, status_text: self.status_text, headers, body: Bytes::from(self.body) })
    }
}

/// Check that a request/response pair may be stored.
///
/// Mirrors `Cache.put`: only `GET`, no partial content, no `Vary: *`.
pub fn check_storable(request: &Request, response: &Response) -> Result<(), Error> {
    if !request.is_get() {
        return Err(Error::InvalidInput(format!("cannot store {} request for {}", request.method, request.url)));
    }
    if response.status == 206 {
        return Err(Error::HttpError(format!("partial response for {} cannot be stored", request.url)));
    }
    if response.vary().iter().any(|name| name == "*") {
        return Err(Error::InvalidState(format!("response for {} has Vary: *", request.url)));
    }
    Ok(())
}

fn capture_vary(request: &Request, response: &Response) -> VaryValues {
    response
        .vary()
        .into_iter()
        .map(|name| {
            let value = request.header(&name).map(str::to_string);
            (name, value)
        })
        .collect()
}

fn vary_matches(stored: &VaryValues, request: &Request) -> bool {
    stored
        .iter()
        .all(|(name, value)| request.header(name) == value.as_deref())
}

fn parse_vary(json: &str) -> Result<VaryValues, Error> {
    Ok(serde_json::from_str(json)?)
}

impl CacheDb {
    /// Store a batch of entries in the named cache, all or nothing.
    ///
    /// The cache is created if absent. An existing entry for the same request
    /// identity is replaced.
    pub async fn put_entries(&self, cache_name: &str, entries: Vec<(Request, Response)>) -> Result<usize, Error> {
        for (request, response) in &entries {
            check_storable(request, response)?;
        }

        let cache_name = cache_name.to_string();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;

                tx.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![cache_name, stored_at],
                )?;
                let cache_id: i64 =
                    tx.query_row("SELECT id FROM caches WHERE name = ?1", params![cache_name], |row| row.get(0))?;

                for (request, response) in &entries {
                    let key = compute_request_key(&request.method, request.url.as_str());

                    let candidates: Vec<(i64, String)> = {
                        let mut stmt = tx.prepare(
                            "SELECT id, vary_json FROM entries WHERE cache_id = ?1 AND request_key = ?2",
                        )?;
                        stmt.query_map(params![cache_id, key], |row| Ok((row.get(0)?, row.get(1)?)))?
                            .collect::<Result<Vec<_>, _>>()?
                    };
                    for (id, vary_json) in candidates {
                        if vary_matches(&parse_vary(&vary_json)?, request) {
                            tx.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
                        }
                    }

                    let vary_json = serde_json::to_string(&capture_vary(request, response))?;
                    let headers_json = serde_json::to_string(&response.headers)?;
                    tx.execute(
                        "INSERT INTO entries (
                            cache_id, request_key, method, request_url, vary_json,
                            response_url, status, status_text, headers_json, body, stored_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                        params![
                            cache_id,
                            key,
                            &request.method,
                            request.url.as_str(),
                            vary_json,
                            response.url.as_str(),
                            response.status,
                            &response.status_text,
                            headers_json,
                            response.body.as_ref(),
                            stored_at,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(entries.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request in one named cache.
    ///
    /// Returns None for a missing cache, a non-GET request, or no match.
    pub async fn match_entry(&self, cache_name: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let cache_name = cache_name.to_string();
        let request = request.clone();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let key = compute_request_key(&request.method, request.url.as_str());
                let mut stmt = conn.prepare(
                    "SELECT e.vary_json, e.response_url, e.status, e.status_text, e.headers_json, e.body
                     FROM entries e JOIN caches c ON c.id = e.cache_id
                     WHERE c.name = ?1 AND e.request_key = ?2
                     ORDER BY e.id ASC",
                )?;
                let rows = stmt
                    .query_map(params![cache_name, key], EntryRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                first_match(rows, &request)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request across every cache, oldest cache first.
    pub async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let request = request.clone();
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let key = compute_request_key(&request.method, request.url.as_str());
                let mut stmt = conn.prepare(
                    "SELECT e.vary_json, e.response_url, e.status, e.status_text, e.headers_json, e.body
                     FROM entries e JOIN caches c ON c.id = e.cache_id
                     WHERE e.request_key = ?1
                     ORDER BY c.id ASC, e.id ASC",
                )?;
                let rows = stmt
                    .query_map(params![key], EntryRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                first_match(rows, &request)
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs stored in a cache, in insertion order.
    ///
    /// Returns None if the cache doesn't exist.
    pub async fn entry_urls(&self, cache_name: &str) -> Result<Option<Vec<String>>, Error> {
        let cache_name = cache_name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Vec<String>>, Error> {
                let cache_id: Option<i64> = match conn.query_row(
                    "SELECT id FROM caches WHERE name = ?1",
                    params![cache_name],
                    |row| row.get(0),
                ) {
                    Ok(id) => Some(id),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };

                let Some(cache_id) = cache_id else {
                    return Ok(None);
                };

                let mut stmt = conn.prepare("SELECT request_url FROM entries WHERE cache_id = ?1 ORDER BY id ASC")?;
                let urls = stmt
                    .query_map(params![cache_id], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(Some(urls))
            })
            .await
            .map_err(Error::from)
    }
}

fn first_match(rows: Vec<EntryRow>, request: &Request) -> Result<Option<Response>, Error> {
    for row in rows {
        if vary_matches(&parse_vary(&row.vary_json)?, request) {
            return row.into_response().map(Some);
        }
    }
    Ok(None)
}
