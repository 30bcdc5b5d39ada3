// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Pinch - Certificate-Pinned HTTPS Requests
//!
//! Issues HTTP(S) requests whose TLS handshake is validated only against
//! certificates bundled with the application, never the system trust store,
//! and keeps a cookie jar shared across requests.
//!
//! ## Features
//!
//! - Pinning: single or multiple bundled certificates, fail-closed
//! - Hostname verification on top of every pin match
//! - Classified errors: pinning vs. TLS rejection vs. timeout vs. transport
//! - In-memory cookie jar updated from `Set-Cookie` responses
//! - Host wire format: `sslPinning`, `timeoutInterval`, `bodyString`
//!
//! ## Example
//!
//! ```rust,no_run
//! use pinch::{PinSpec, PinchClient, PinchConfig, RequestDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PinchClient::with_asset_dir("assets/certs", PinchConfig::default());
//!
//!     let response = client
//!         .fetch(RequestDescriptor::get("https://api.example.com/me").pin(PinSpec::single("api")))
//!         .await?;
//!
//!     println!("{} {}", response.status, response.status_text);
//!     println!("cookies: {:?}", client.get_cookies());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod tls;
pub mod wire;

// Configuration
pub use config::{PinScope, PinchConfig, SetCookiePolicy};

// Errors
pub use error::{CertificateLoadError, RequestError, Result, TrustBuildError};

// HTTP
pub use http::{Cookie, CookieJar, PinSpec, PinchClient, RequestDescriptor, ResponseDescriptor};

// TLS
pub use tls::{
    CertificateLoader, DirectoryResolver, ResourceResolver, StaticResolver, TrustAnchorSet,
    TrustContext, TrustContextBuilder,
};

// Wire format
pub use wire::{fetch_json, FetchOptions, SslPinningOptions};

/// Pinch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
