// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request descriptor and pin spec

use std::time::Duration;

use indexmap::IndexMap;

/// Which bundled certificates a request is pinned to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinSpec {
    /// A single bundled certificate
    SingleCert(String),
    /// Several bundled certificates; any one of them may match
    MultiCert(Vec<String>),
}

impl PinSpec {
    /// Pin to one certificate
    pub fn single(name: impl Into<String>) -> Self {
        PinSpec::SingleCert(name.into())
    }

    /// Pin to any of several certificates
    pub fn multi<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PinSpec::MultiCert(names.into_iter().map(Into::into).collect())
    }

    /// Certificate names in the order given
    pub fn names(&self) -> &[String] {
        match self {
            PinSpec::SingleCert(name) => std::slice::from_ref(name),
            PinSpec::MultiCert(names) => names,
        }
    }

    /// Sorted, de-duplicated names; identifies the resulting trust context
    pub fn cache_key(&self) -> Vec<String> {
        let mut key = self.names().to_vec();
        key.sort();
        key.dedup();
        key
    }
}

/// A request as handed to the executor
///
/// Built once with the chained setters and not changed afterwards. The URL
/// and method are validated when the request is executed.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Absolute http(s) URL
    pub url: String,
    /// Request method
    pub method: String,
    /// Request headers, in the order they were added
    pub headers: IndexMap<String, String>,
    /// Request body
    pub body: Option<String>,
    /// Connect and read timeout
    pub timeout: Option<Duration>,
    /// Certificate pinning
    pub pin_spec: Option<PinSpec>,
}

impl RequestDescriptor {
    /// Create a GET request for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: IndexMap::new(),
            body: None,
            timeout: None,
            pin_spec: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url).method("POST")
    }

    /// Set the method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set a header, replacing any header with the same name
    ///
    /// Names compare case-insensitively; the most recent spelling is kept.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if let Some(existing) = self.header_name(&name).map(str::to_string) {
            self.headers.shift_remove(&existing);
        }
        self.headers.insert(name, value.into());
        self
    }

    /// Set multiple headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.header(name, value);
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Pin the request to bundled certificates
    pub fn pin(mut self, pin_spec: PinSpec) -> Self {
        self.pin_spec = Some(pin_spec);
        self
    }

    /// Look up a header value case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn header_name(&self, name: &str) -> Option<&str> {
        self.headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Whether the method may carry a body
    pub fn method_allows_body(&self) -> bool {
        !["GET", "HEAD", "TRACE"]
            .iter()
            .any(|m| self.method.eq_ignore_ascii_case(m))
    }
}
