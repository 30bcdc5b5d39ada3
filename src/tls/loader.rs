// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bundled certificate loading
//!
//! Certificates ship with the application and are looked up by name through a
//! [`ResourceResolver`]. Each resource must hold exactly one certificate, PEM
//! or DER encoded.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use rustls::server::ParsedCertificate;

use crate::error::CertificateLoadError;

/// Source of bundled resources
pub trait ResourceResolver: Send + Sync + fmt::Debug {
    /// Return the raw bytes of `name`, or `None` if there is no such resource
    fn resolve(&self, name: &str) -> io::Result<Option<Vec<u8>>>;
}

/// Resolves resource names against an asset directory
///
/// A name without an extension also matches `<name>.<ext>` for each
/// configured extension, tried in order.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectoryResolver {
    /// Create a resolver rooted at `root` with no extension fallbacks
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
        }
    }

    /// Set the extensions tried for bare names
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Asset directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(name)];
        if Path::new(name).extension().is_none() {
            paths.extend(
                self.extensions
                    .iter()
                    .map(|ext| self.root.join(format!("{}.{}", name, ext.trim_start_matches('.')))),
            );
        }
        paths
    }
}

/// Names must stay inside the asset directory
fn is_contained(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

impl ResourceResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        if !is_contained(name) {
            tracing::warn!(name, "Refusing resource name outside the asset directory");
            return Ok(None);
        }

        for path in self.candidates(name) {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    tracing::debug!(name, path = %path.display(), "Resolved bundled resource");
                    return Ok(Some(bytes));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

/// In-memory resources, e.g. certificates embedded with `include_bytes!`
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    resources: HashMap<String, Vec<u8>>,
}

impl StaticResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a resource
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.resources.insert(name.into(), bytes.into());
    }
}

impl ResourceResolver for StaticResolver {
    fn resolve(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.resources.get(name).cloned())
    }
}

/// Loads and parses bundled certificates
#[derive(Debug, Clone)]
pub struct CertificateLoader {
    resolver: Arc<dyn ResourceResolver>,
}

impl CertificateLoader {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self { resolver }
    }

    /// Load the certificate named `name`
    pub fn load(&self, name: &str) -> Result<CertificateDer<'static>, CertificateLoadError> {
        let bytes = self
            .resolver
            .resolve(name)
            .map_err(|e| CertificateLoadError::Unreadable {
                name: name.to_string(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| CertificateLoadError::NotFound {
                name: name.to_string(),
            })?;

        parse_certificate(name, &bytes)
    }
}

/// Parse exactly one certificate from PEM or DER bytes
pub fn parse_certificate(
    name: &str,
    bytes: &[u8],
) -> Result<CertificateDer<'static>, CertificateLoadError> {
    let der = if looks_like_pem(bytes) {
        let mut certs = Vec::new();
        for item in rustls_pemfile::certs(&mut &bytes[..]) {
            let cert = item.map_err(|e| {
                CertificateLoadError::malformed(name, format!("invalid PEM: {}", e))
            })?;
            certs.push(cert);
        }
        if certs.len() != 1 {
            return Err(CertificateLoadError::malformed(
                name,
                format!("expected exactly one certificate, found {}", certs.len()),
            ));
        }
        certs.remove(0)
    } else {
        if bytes.is_empty() {
            return Err(CertificateLoadError::malformed(name, "empty resource"));
        }
        CertificateDer::from(bytes.to_vec())
    };

    ParsedCertificate::try_from(&der)
        .map_err(|e| CertificateLoadError::malformed(name, format!("invalid X.509: {}", e)))?;

    Ok(der)
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(b"-----BEGIN")
}
