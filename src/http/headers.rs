//! Download header helpers
//!
//! Cache policy values, HTTP-date formatting for `Last-Modified`, and the
//! `Content-Disposition` value for attachment downloads.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Cache control policy for served content
#[derive(Debug, Clone, Copy)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// Private cache (browser cache only)
    Private(u32),
    /// No cache
    NoCache,
    /// No store
    NoStore,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    #[must_use]
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::Private(max_age) => format!("private, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
            Self::NoStore => "no-store".to_string(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600) // 1 hour
    }
}

/// Format a filesystem timestamp as an IMF-fixdate for `Last-Modified`.
///
/// # Examples
/// ```
/// use std::time::SystemTime;
/// use quickserve::http::headers::http_date;
/// assert_eq!(http_date(SystemTime::UNIX_EPOCH), "Thu, 01 Jan 1970 00:00:00 GMT");
/// ```
#[must_use]
pub fn http_date(t: SystemTime) -> String {
    DateTime::<Utc>::from(t)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// `Content-Disposition` value marking the response as a named download.
///
/// Control characters are stripped and quote/backslash escaped so the
/// value stays a single well-formed quoted-string.
#[must_use]
pub fn attachment_disposition(file_name: &str) -> String {
    let mut escaped = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            c if c.is_control() => {}
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    format!("attachment; filename=\"{escaped}\"")
}
