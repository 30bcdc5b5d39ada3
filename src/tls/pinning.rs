// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pinned trust contexts
//!
//! A [`TrustContext`] accepts a TLS peer only when the presented certificate
//! is byte-identical to one of the bundled certificates in its
//! [`TrustAnchorSet`] *and* the certificate is valid for the requested host.
//! The system trust store is never consulted.

use std::sync::Arc;

use dashmap::DashMap;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, SignatureScheme};

use super::loader::CertificateLoader;
use crate::config::PinScope;
use crate::error::TrustBuildError;
use crate::http::PinSpec;

/// Ordered, de-duplicated, non-empty set of pinned certificates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchorSet {
    certs: Vec<CertificateDer<'static>>,
}

impl TrustAnchorSet {
    /// Build from parsed certificates; an empty input is an error
    pub fn new(
        certs: impl IntoIterator<Item = CertificateDer<'static>>,
    ) -> Result<Self, TrustBuildError> {
        let mut unique: Vec<CertificateDer<'static>> = Vec::new();
        for cert in certs {
            if !unique.contains(&cert) {
                unique.push(cert);
            }
        }
        if unique.is_empty() {
            return Err(TrustBuildError::EmptyPinSpec);
        }
        Ok(Self { certs: unique })
    }

    /// Check if `cert` is byte-identical to a pinned certificate
    pub fn contains(&self, cert: &CertificateDer<'_>) -> bool {
        self.certs.iter().any(|pinned| pinned.as_ref() == cert.as_ref())
    }

    pub(crate) fn len(&self) -> usize {
        self.certs.len()
    }
}

/// Server certificate verifier that only trusts pinned certificates
#[derive(Debug)]
pub struct PinnedCertVerifier {
    anchors: TrustAnchorSet,
    scope: PinScope,
    provider: Arc<CryptoProvider>,
}

impl PinnedCertVerifier {
    pub fn new(anchors: TrustAnchorSet, scope: PinScope, provider: Arc<CryptoProvider>) -> Self {
        Self {
            anchors,
            scope,
            provider,
        }
    }

    fn is_pinned(&self, end_entity: &CertificateDer<'_>, intermediates: &[CertificateDer<'_>]) -> bool {
        match self.scope {
            PinScope::Leaf => self.anchors.contains(end_entity),
            PinScope::Chain => {
                self.anchors.contains(end_entity)
                    || intermediates.iter().any(|cert| self.anchors.contains(cert))
            }
        }
    }
}

impl ServerCertVerifier for PinnedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        if !self.is_pinned(end_entity, intermediates) {
            tracing::warn!(
                server = ?server_name,
                scope = ?self.scope,
                "Peer certificate does not match any pinned certificate"
            );
            return Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ));
        }

        // A pin match never replaces the hostname check.
        let parsed = ParsedCertificate::try_from(end_entity)?;
        rustls::client::verify_server_name(&parsed, server_name)?;

        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// TLS client configuration restricted to a pinned anchor set
#[derive(Debug, Clone)]
pub struct TrustContext {
    config: Arc<ClientConfig>,
    anchors: TrustAnchorSet,
}

impl TrustContext {
    /// Build a trust context over `anchors`
    pub fn new(anchors: TrustAnchorSet, scope: PinScope) -> Result<Self, TrustBuildError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let verifier = PinnedCertVerifier::new(anchors.clone(), scope, provider.clone());

        let mut config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| TrustBuildError::Tls(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();
        config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(Self {
            config: Arc::new(config),
            anchors,
        })
    }

    /// The rustls configuration to hand to the HTTP stack
    pub fn client_config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn anchors(&self) -> &TrustAnchorSet {
        &self.anchors
    }
}

/// Builds trust contexts from pin specs, optionally caching them
///
/// Cached contexts are keyed by the sorted, de-duplicated certificate names
/// and never invalidated: bundled certificates do not change at runtime.
#[derive(Debug, Clone)]
pub struct TrustContextBuilder {
    loader: CertificateLoader,
    scope: PinScope,
    cache: Option<Arc<DashMap<Vec<String>, TrustContext>>>,
}

impl TrustContextBuilder {
    pub fn new(loader: CertificateLoader, scope: PinScope) -> Self {
        Self {
            loader,
            scope,
            cache: None,
        }
    }

    /// Enable the trust context cache
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Arc::new(DashMap::new()));
        self
    }

    /// Build (or fetch from cache) the trust context for `pin_spec`
    ///
    /// Fails on the first certificate that does not load; a partial anchor
    /// set is never used.
    pub fn build(&self, pin_spec: &PinSpec) -> Result<TrustContext, TrustBuildError> {
        let key = pin_spec.cache_key();
        if key.is_empty() {
            return Err(TrustBuildError::EmptyPinSpec);
        }

        if let Some(cache) = &self.cache {
            if let Some(context) = cache.get(&key) {
                tracing::debug!(certs = ?key, "Trust context cache hit");
                return Ok(context.clone());
            }
        }

        let mut certs = Vec::with_capacity(pin_spec.names().len());
        for name in pin_spec.names() {
            certs.push(self.loader.load(name)?);
        }
        let context = TrustContext::new(TrustAnchorSet::new(certs)?, self.scope)?;
        tracing::debug!(
            certs = ?key,
            anchors = context.anchors().len(),
            "Built pinned trust context"
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, context.clone());
        }
        Ok(context)
    }

    /// Number of cached trust contexts
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }
}
