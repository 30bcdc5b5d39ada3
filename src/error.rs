// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for pinch
//!
//! Three layers, each with its own enum: certificate loading, trust context
//! construction and request execution. Every failure that leaves
//! [`PinchClient::fetch`](crate::PinchClient::fetch) is a [`RequestError`].

use thiserror::Error;

/// Result type alias for request execution
pub type Result<T> = std::result::Result<T, RequestError>;

/// A bundled certificate could not be loaded
///
/// All variants are configuration errors and are never worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateLoadError {
    /// No bundled resource with this name
    #[error("certificate '{name}' not found")]
    NotFound { name: String },

    /// The resource exists but could not be read
    #[error("certificate '{name}' could not be read: {reason}")]
    Unreadable { name: String, reason: String },

    /// The resource is not exactly one well-formed PEM or DER certificate
    #[error("certificate '{name}' is malformed: {reason}")]
    MalformedEncoding { name: String, reason: String },
}

impl CertificateLoadError {
    /// Name of the resource that failed to load
    pub fn name(&self) -> &str {
        match self {
            CertificateLoadError::NotFound { name }
            | CertificateLoadError::Unreadable { name, .. }
            | CertificateLoadError::MalformedEncoding { name, .. } => name,
        }
    }

    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        CertificateLoadError::MalformedEncoding {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// A pinned trust context could not be built
///
/// There is no partial result: one bad certificate fails the whole pin set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustBuildError {
    /// The pin spec named no certificates
    #[error("pin spec contains no certificate names")]
    EmptyPinSpec,

    /// One of the named certificates failed to load
    #[error("failed to load pinned certificate: {0}")]
    CertificateLoad(#[from] CertificateLoadError),

    /// The TLS configuration could not be assembled
    #[error("failed to build TLS configuration: {0}")]
    Tls(String),
}

/// Classified failure of a single request
#[derive(Error, Debug)]
pub enum RequestError {
    /// URL did not parse as an absolute http(s) URL, or cannot be pinned
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Method, headers or wire options were unusable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Trust context for the pin spec could not be built
    #[error("Certificate pinning failed: {0}")]
    Pinning(#[from] TrustBuildError),

    /// The peer certificate was rejected during the TLS handshake
    #[error("TLS validation failed for {url}: {reason}")]
    TlsValidationFailed { url: String, reason: String },

    /// Connect or read deadline elapsed
    #[error("Request to {url} timed out after {duration_ms}ms")]
    Timeout { url: String, duration_ms: u64 },

    /// Connection could not be established or broke mid-request
    #[error("Connection to {url} failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The server answered with something that is not valid HTTP
    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
}

impl RequestError {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        RequestError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        RequestError::InvalidRequest(reason.into())
    }

    /// Create a connection error
    pub fn connection(url: impl Into<String>, reason: impl Into<String>) -> Self {
        RequestError::ConnectionFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(url: impl Into<String>, duration_ms: u64) -> Self {
        RequestError::Timeout {
            url: url.into(),
            duration_ms,
        }
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, RequestError::Timeout { .. })
    }

    /// Check if the peer certificate was rejected
    pub fn is_tls_validation_failure(&self) -> bool {
        matches!(self, RequestError::TlsValidationFailed { .. })
    }

    /// Check if this is caused by the caller's own input or bundled assets
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RequestError::InvalidUrl { .. }
                | RequestError::InvalidRequest(_)
                | RequestError::Pinning(_)
        )
    }

    /// Check if a caller could reasonably retry
    ///
    /// The executor itself never retries. TLS validation failures are never
    /// retryable: a rejected pin is the expected outcome under attack.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RequestError::Timeout { .. } | RequestError::ConnectionFailed { .. }
        )
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            RequestError::InvalidUrl { url, .. }
            | RequestError::TlsValidationFailed { url, .. }
            | RequestError::Timeout { url, .. }
            | RequestError::ConnectionFailed { url, .. }
            | RequestError::MalformedResponse { url, .. } => Some(url),
            RequestError::InvalidRequest(_) | RequestError::Pinning(_) => None,
        }
    }
}
