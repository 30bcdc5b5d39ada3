// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request executor
//!
//! Every request gets its own single-use HTTP/1.1 client, so the trust
//! context of one request can never leak into another and the connection is
//! closed as soon as the request future completes or is dropped.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use url::Url;

use super::cookie::CookieJar;
use super::headers;
use super::request::RequestDescriptor;
use super::response::ResponseDescriptor;
use crate::config::{PinchConfig, SetCookiePolicy};
use crate::error::{RequestError, Result};
use crate::tls::{
    CertificateLoader, DirectoryResolver, ResourceResolver, TrustContext, TrustContextBuilder,
};

/// HTTP client with certificate pinning and a shared cookie jar
#[derive(Debug, Clone)]
pub struct PinchClient {
    config: PinchConfig,
    trust: TrustContextBuilder,
    cookie_jar: CookieJar,
}

impl PinchClient {
    /// Create a client resolving bundled certificates through `resolver`
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self::with_config(resolver, PinchConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(resolver: Arc<dyn ResourceResolver>, config: PinchConfig) -> Self {
        let mut trust =
            TrustContextBuilder::new(CertificateLoader::new(resolver), config.pin_scope);
        if config.cache_trust_contexts {
            trust = trust.with_cache();
        }

        Self {
            config,
            trust,
            cookie_jar: CookieJar::new(),
        }
    }

    /// Create a client whose bundled certificates live in `dir`
    pub fn with_asset_dir(dir: impl Into<PathBuf>, config: PinchConfig) -> Self {
        let resolver =
            DirectoryResolver::new(dir).with_extensions(config.certificate_extensions.clone());
        Self::with_config(Arc::new(resolver), config)
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Snapshot of the cookie jar as name → value
    pub fn get_cookies(&self) -> HashMap<String, String> {
        self.cookie_jar.get_all()
    }

    /// Get client configuration
    pub fn config(&self) -> &PinchConfig {
        &self.config
    }

    /// Execute a request using this client's cookie jar
    pub async fn fetch(&self, descriptor: RequestDescriptor) -> Result<ResponseDescriptor> {
        self.execute(descriptor, &self.cookie_jar).await
    }

    /// Execute a request against an explicit cookie jar
    ///
    /// Any HTTP status is a successful response. Only URL, pinning, TLS,
    /// timeout, transport and protocol problems are errors. Nothing is
    /// retried.
    pub async fn execute(
        &self,
        descriptor: RequestDescriptor,
        jar: &CookieJar,
    ) -> Result<ResponseDescriptor> {
        let start = Instant::now();
        let url = parse_url(&descriptor.url)?;
        if descriptor.pin_spec.is_some() && url.scheme() != "https" {
            return Err(RequestError::invalid_url(
                url.as_str(),
                "certificate pinning requires an https URL",
            ));
        }
        let method = Method::from_bytes(descriptor.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| {
                RequestError::invalid_request(format!("invalid method '{}'", descriptor.method))
            })?;
        let timeout = descriptor.timeout.or(self.config.default_timeout);

        let trust = match &descriptor.pin_spec {
            Some(spec) => Some(self.trust.build(spec).map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Refusing request: pinned trust context unavailable");
                RequestError::from(e)
            })?),
            None => None,
        };
        tracing::debug!(
            method = %method,
            url = %url,
            pinned = trust.is_some(),
            timeout_ms = timeout.map(millis),
            "Executing request"
        );

        let client = self.build_client(trust.as_ref(), timeout)?;
        let descriptor = jar.apply_to_outgoing_request(descriptor);
        let allows_body = descriptor.method_allows_body();

        let mut builder = client.request(method.clone(), url.clone());
        for (name, value) in &descriptor.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                RequestError::invalid_request(format!("invalid header name '{}'", name))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                RequestError::invalid_request(format!("invalid value for header '{}'", name))
            })?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(body) = descriptor.body {
            if allows_body {
                builder = builder.body(body);
            } else {
                tracing::warn!(method = %method, url = %url, "Dropping request body for method without a body");
            }
        }

        let send = builder.send();
        let response = match timeout {
            // Connect and first response byte are each bounded by the timeout.
            Some(t) => tokio::time::timeout(t.saturating_mul(2), send)
                .await
                .map_err(|_| RequestError::timeout(url.as_str(), millis(t)))?,
            None => send.await,
        }
        .map_err(|e| classify(&url, timeout, e))?;

        let status = response.status();
        let reason = response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
            .map(str::to_string);
        let response_headers = response.headers().clone();
        let body = read_body(response, &url, timeout).await?;

        let mut set_cookies = response_headers
            .get_all(headers::SET_COOKIE)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        match self.config.set_cookie_policy {
            SetCookiePolicy::FirstOnly => {
                if let Some(first) = set_cookies.next() {
                    jar.apply_set_cookie_header(&first);
                }
            }
            SetCookiePolicy::All => {
                for value in set_cookies {
                    jar.apply_set_cookie_header(&value);
                }
            }
        }

        tracing::info!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = millis(start.elapsed()),
            "Request complete"
        );

        let response = ResponseDescriptor::new(status, &response_headers, &body);
        Ok(match reason {
            Some(reason) => response.with_status_text(reason),
            None => response,
        })
    }

    fn build_client(&self, trust: Option<&TrustContext>, timeout: Option<Duration>) -> Result<Client> {
        let max_redirects = self.config.max_redirects;
        let mut builder = Client::builder().http1_only().pool_max_idle_per_host(0);

        if let Some(user_agent) = &self.config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        if let Some(t) = timeout {
            builder = builder.connect_timeout(t).read_timeout(t);
        }

        builder = match trust {
            Some(context) => builder
                .use_preconfigured_tls(context.client_config().clone())
                .redirect(Policy::custom(move |attempt| {
                    if attempt.url().scheme() != "https" {
                        attempt.error("refusing redirect away from pinned https")
                    } else if attempt.previous().len() >= max_redirects {
                        attempt.error("too many redirects")
                    } else {
                        attempt.follow()
                    }
                })),
            None => builder.redirect(Policy::limited(max_redirects)),
        };

        builder.build().map_err(|e| {
            RequestError::invalid_request(format!("failed to configure HTTP client: {}", e))
        })
    }
}

/// Validate an absolute http(s) URL with a host
fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| RequestError::invalid_url(raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RequestError::invalid_url(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(RequestError::invalid_url(raw, "missing host"));
    }
    Ok(url)
}

/// Read the whole body; each chunk must arrive within the read timeout
async fn read_body(
    mut response: reqwest::Response,
    url: &Url,
    timeout: Option<Duration>,
) -> Result<BytesMut> {
    let mut body = BytesMut::new();
    loop {
        let chunk = match timeout {
            Some(t) => tokio::time::timeout(t, response.chunk())
                .await
                .map_err(|_| RequestError::timeout(url.as_str(), millis(t)))?,
            None => response.chunk().await,
        }
        .map_err(|e| classify(url, timeout, e))?;

        match chunk {
            Some(bytes) => body.extend_from_slice(&bytes),
            None => return Ok(body),
        }
    }
}

/// Map a transport error onto the request error taxonomy
fn classify(url: &Url, timeout: Option<Duration>, err: reqwest::Error) -> RequestError {
    let url = err.url().unwrap_or(url).to_string();

    if let Some(reason) = certificate_failure(&err) {
        tracing::warn!(url = %url, reason = %reason, "TLS peer certificate rejected");
        return RequestError::TlsValidationFailed { url, reason };
    }
    if err.is_timeout() {
        return RequestError::Timeout {
            url,
            duration_ms: timeout.map_or(0, millis),
        };
    }
    if err.is_decode() || is_parse_error(&err) {
        return RequestError::MalformedResponse {
            url,
            reason: describe(&err),
        };
    }
    RequestError::ConnectionFailed {
        url,
        reason: describe(&err),
    }
}

/// Find a rustls certificate rejection anywhere in the source chain
fn certificate_failure(err: &(dyn StdError + 'static)) -> Option<String> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(tls) = as_rustls(e) {
            if matches!(
                tls,
                rustls::Error::InvalidCertificate(_) | rustls::Error::NoCertificatesPresented
            ) {
                return Some(tls.to_string());
            }
        }
        current = e.source();
    }
    None
}

// io::Error::source() skips the wrapped error, and the connector nests
// io::Errors, so unwrap every layer explicitly.
fn as_rustls<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a rustls::Error> {
    let mut current = err;
    loop {
        if let Some(tls) = current.downcast_ref::<rustls::Error>() {
            return Some(tls);
        }
        let inner: &(dyn StdError + 'static) = current.downcast_ref::<std::io::Error>()?.get_ref()?;
        current = inner;
    }
}

fn is_parse_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(hyper_err) = e.downcast_ref::<hyper::Error>() {
            if hyper_err.is_parse() || hyper_err.is_parse_status() {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// Error message followed by its sources
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CertificateLoadError, TrustBuildError};
    use crate::http::PinSpec;
    use crate::tls::StaticResolver;

    fn client() -> PinchClient {
        PinchClient::new(Arc::new(StaticResolver::new()))
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com/path").is_ok());
        assert!(parse_url("http://127.0.0.1:8080").is_ok());

        for bad in ["/relative/path", "ftp://example.com/file", "not a url", "file:///etc/hosts"] {
            assert!(
                matches!(parse_url(bad), Err(RequestError::InvalidUrl { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let err = client()
            .fetch(RequestDescriptor::new("example.com/no-scheme"))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_pinning_plain_http_is_refused() {
        let err = client()
            .fetch(RequestDescriptor::new("http://example.com").pin(PinSpec::single("leaf.pem")))
            .await
            .unwrap_err();
        match err {
            RequestError::InvalidUrl { reason, .. } => assert!(reason.contains("https")),
            other => panic!("Expected InvalidUrl, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_pinned_cert_is_pinning_error() {
        let err = client()
            .fetch(RequestDescriptor::new("https://example.com").pin(PinSpec::single("leaf.pem")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::Pinning(TrustBuildError::CertificateLoad(
                CertificateLoadError::NotFound { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_invalid_method() {
        let err = client()
            .fetch(RequestDescriptor::new("https://example.com").method("BAD METHOD"))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidRequest(_)));
    }

    #[test]
    fn test_certificate_failure_found_through_io_error() {
        let io = std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(rustls::CertificateError::UnknownIssuer),
        );
        assert!(certificate_failure(&io).is_some());

        let plain = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(certificate_failure(&plain).is_none());
    }

    #[test]
    fn test_certificate_failure_found_through_nested_io_errors() {
        let inner = std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            rustls::Error::InvalidCertificate(
                rustls::CertificateError::ApplicationVerificationFailure,
            ),
        );
        let outer = std::io::Error::new(std::io::ErrorKind::Other, inner);
        let reason = certificate_failure(&outer).expect("nested rustls error should be found");
        assert!(reason.contains("ApplicationVerificationFailure"), "{}", reason);

        let nested_plain = std::io::Error::new(
            std::io::ErrorKind::Other,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "bad frame"),
        );
        assert!(certificate_failure(&nested_plain).is_none());
    }
}
