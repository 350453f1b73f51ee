//! HTTP cache validation module
//!
//! Provides `ETag` / `Last-Modified` validators and conditional request handling.

use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// IMF-fixdate, the only date format servers may generate
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Validators describing one version of a served file
#[derive(Debug, Clone)]
pub struct Validators {
    pub etag: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Validators {
    pub fn new(content: &[u8], modified: Option<SystemTime>) -> Self {
        Self {
            etag: generate_etag(content),
            // HTTP dates carry whole seconds only
            last_modified: modified.map(|t| truncate_to_secs(DateTime::<Utc>::from(t))),
        }
    }

    pub fn last_modified_header(&self) -> Option<String> {
        self.last_modified.map(format_http_date)
    }

    /// Whether the client's cached copy is still fresh (respond 304)
    ///
    /// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
    /// when the client sent no entity tags.
    pub fn is_not_modified(
        &self,
        if_none_match: Option<&str>,
        if_modified_since: Option<&str>,
    ) -> bool {
        if if_none_match.is_some() {
            return check_etag_match(if_none_match, &self.etag);
        }
        match (if_modified_since.and_then(parse_http_date), self.last_modified) {
            (Some(since), Some(modified)) => modified <= since,
            _ => false,
        }
    }
}

/// Generate `ETag` using fast hashing
///
/// Returns a quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports single tags, comma-separated lists, weak tags (`W/"..."`) and `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn truncate_to_secs(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(time.timestamp(), 0).unwrap_or(time)
}
