// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-memory cookie jar shared by all requests of one client
//!
//! Cookies are keyed by name only. Attributes other than expiry are parsed
//! and kept for inspection but play no part in matching. Nothing is ever
//! written to disk.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;

use super::headers;
use super::request::RequestDescriptor;

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Path attribute, if any
    pub path: Option<String>,
    /// Domain attribute, if any
    pub domain: Option<String>,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
}

impl Cookie {
    /// Create a new session cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(false, |exp| exp <= now)
    }

    /// Parse a Set-Cookie header value
    ///
    /// Returns `None` when there is no `name=value` pair or the name is empty.
    /// Max-Age takes precedence over Expires; unparseable dates are ignored.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        let mut cookie = Cookie::new(name, unquote(value.trim()));

        let mut max_age = None;
        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(val.to_string()),
                    "domain" => cookie.domain = Some(val.trim_start_matches('.').to_string()),
                    "expires" => {
                        if let Some(dt) = parse_cookie_date(val) {
                            cookie.expires = Some(dt);
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            max_age = Some(secs);
                        }
                    }
                    _ => {}
                }
            } else {
                match part.to_ascii_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        if let Some(secs) = max_age {
            cookie.expires = Some(if secs <= 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                Utc::now() + chrono::Duration::seconds(secs.min(i64::from(i32::MAX)))
            });
        }

        Some(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Date formats seen in `Expires` besides RFC 2822 (Netscape, RFC 850, asctime)
const COOKIE_DATE_FORMATS: &[&str] = &[
    "%a, %d-%b-%y %H:%M:%S GMT",
    "%a, %d-%b-%Y %H:%M:%S GMT",
    "%A, %d-%b-%y %H:%M:%S GMT",
    "%a %b %e %H:%M:%S %Y",
];

fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    COOKIE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Thread-safe cookie storage
///
/// Clones share the same underlying jar.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<Mutex<HashMap<String, Cookie>>>,
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a cookie; an expired cookie removes its name instead
    pub fn add(&self, cookie: Cookie) {
        let mut cookies = self.cookies.lock();
        if cookie.is_expired() {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name.clone(), cookie);
        }
    }

    /// Apply one Set-Cookie header value
    ///
    /// Malformed values are logged and dropped; they never fail a request.
    pub fn apply_set_cookie_header(&self, header: &str) {
        match Cookie::parse(header) {
            Some(cookie) => {
                tracing::debug!(name = %cookie.name, "Storing cookie");
                self.add(cookie);
            }
            None => {
                let name = header.split(['=', ';']).next().unwrap_or("").trim();
                tracing::warn!(name, "Ignoring malformed Set-Cookie header");
            }
        }
    }

    /// Snapshot of all live cookies as name → value
    pub fn get_all(&self) -> HashMap<String, String> {
        let mut cookies = self.cookies.lock();
        let now = Utc::now();
        cookies.retain(|_, c| !c.is_expired_at(now));
        cookies
            .values()
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect()
    }

    /// Get a live cookie by name
    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .lock()
            .get(name)
            .filter(|c| !c.is_expired())
            .cloned()
    }

    /// Cookie header value for all live cookies, sorted by name
    pub fn cookie_header(&self) -> Option<String> {
        let mut pairs: Vec<(String, String)> = self.get_all().into_iter().collect();
        if pairs.is_empty() {
            return None;
        }
        pairs.sort();
        Some(
            pairs
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Merge the jar into an outgoing request's `Cookie` header
    ///
    /// A caller-supplied `Cookie` header is kept as is; jar cookies are only
    /// appended for names the caller did not set.
    pub fn apply_to_outgoing_request(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        let mut pairs: Vec<(String, String)> = self.get_all().into_iter().collect();
        if pairs.is_empty() {
            return descriptor;
        }
        pairs.sort();

        let existing = descriptor
            .header_value(headers::COOKIE)
            .map(str::to_string);
        let caller_names: Vec<&str> = existing
            .as_deref()
            .map(|header| {
                header
                    .split(';')
                    .filter_map(|pair| pair.split_once('=').map(|(name, _)| name.trim()))
                    .collect()
            })
            .unwrap_or_default();

        let jar_part = pairs
            .iter()
            .filter(|(name, _)| !caller_names.contains(&name.as_str()))
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        let merged = match existing.as_deref().map(str::trim) {
            Some(caller) if !caller.is_empty() && jar_part.is_empty() => caller.to_string(),
            Some(caller) if !caller.is_empty() => {
                format!("{}; {}", caller.trim_end_matches(';'), jar_part)
            }
            _ => jar_part,
        };
        let name = descriptor
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(headers::COOKIE))
            .cloned()
            .unwrap_or_else(|| "Cookie".to_string());
        descriptor.header(name, merged)
    }

    /// Remove a cookie by name
    pub fn remove(&self, name: &str) {
        self.cookies.lock().remove(name);
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.lock().clear();
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.lock().len()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
