// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response descriptor

use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Response returned for every HTTP status, including 4xx and 5xx
///
/// Serializes as `{status, statusText, bodyString, headers}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDescriptor {
    /// Response status code
    pub status: u16,
    /// Reason phrase as sent by the server, else the canonical one
    pub status_text: String,
    /// Response body, decoded as UTF-8 (lossy)
    pub body_string: String,
    /// Response headers in arrival order; the last line wins for repeated names
    ///
    /// Names are lower-cased by the HTTP stack, so use [`header`](Self::header)
    /// for case-insensitive lookups.
    pub headers: IndexMap<String, String>,
}

impl ResponseDescriptor {
    /// Create a new response
    pub fn new(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body_string: String::from_utf8_lossy(body).into_owned(),
            headers: collapse_headers(headers),
        }
    }

    /// Replace the reason phrase with the one received on the wire
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if status is client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if status is server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Get body as text
    pub fn text(&self) -> &str {
        &self.body_string
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body_string)
    }

    /// Get a header value, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// One entry per header name, keeping the position of the first occurrence
/// and the value of the last
fn collapse_headers(headers: &HeaderMap) -> IndexMap<String, String> {
    let mut collapsed = IndexMap::with_capacity(headers.keys_len());
    for (name, value) in headers.iter() {
        collapsed.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    collapsed
}
