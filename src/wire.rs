// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host-facing request options and result convention
//!
//! Hosts pass loosely-typed options (`method`, `headers`, `body`,
//! `timeoutInterval`, `sslPinning`) and get back either the serialized
//! response `{status, statusText, bodyString, headers}` or an error message.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{RequestError, Result};
use crate::http::{PinSpec, PinchClient, RequestDescriptor, ResponseDescriptor};

/// Pinning option: `{"cert": "name"}` or `{"certs": ["a", "b"]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslPinningOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certs: Option<Vec<String>>,
}

impl SslPinningOptions {
    /// Resolve into a pin spec; `cert` wins when both are given
    pub fn into_pin_spec(self) -> Result<PinSpec> {
        if let Some(cert) = self.cert {
            if cert.trim().is_empty() {
                return Err(RequestError::invalid_request("sslPinning.cert is empty"));
            }
            return Ok(PinSpec::SingleCert(cert));
        }
        match self.certs {
            Some(certs) if !certs.is_empty() => Ok(PinSpec::MultiCert(certs)),
            Some(_) => Err(RequestError::invalid_request("sslPinning.certs is empty")),
            None => Err(RequestError::invalid_request(
                "sslPinning requires either 'cert' or 'certs'",
            )),
        }
    }
}

/// Request options as sent by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_pinning: Option<SslPinningOptions>,
}

impl FetchOptions {
    /// Parse options from JSON; empty input means no options
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
            .map_err(|e| RequestError::invalid_request(format!("invalid fetch options: {}", e)))
    }

    /// Build the request descriptor for `url`
    pub fn into_descriptor(self, url: impl Into<String>) -> Result<RequestDescriptor> {
        let mut descriptor = RequestDescriptor::new(url);
        if let Some(method) = self.method {
            descriptor = descriptor.method(method);
        }
        if let Some(headers) = self.headers {
            descriptor = descriptor.headers(headers);
        }
        if let Some(body) = self.body {
            descriptor = descriptor.body(body);
        }
        if let Some(ms) = self.timeout_interval {
            descriptor = descriptor.timeout(Duration::from_millis(ms));
        }
        if let Some(pinning) = self.ssl_pinning {
            descriptor = descriptor.pin(pinning.into_pin_spec()?);
        }
        Ok(descriptor)
    }
}

/// Fetch with host options; yields the response JSON or the error message
pub async fn fetch_json(
    client: &PinchClient,
    url: &str,
    options_json: &str,
) -> std::result::Result<String, String> {
    match fetch_with_options(client, url, options_json).await {
        Ok(response) => serde_json::to_string(&response).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

async fn fetch_with_options(
    client: &PinchClient,
    url: &str,
    options_json: &str,
) -> Result<ResponseDescriptor> {
    let descriptor = FetchOptions::from_json(options_json)?.into_descriptor(url)?;
    client.fetch(descriptor).await
}
