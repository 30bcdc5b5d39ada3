// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Certificate pinning
//!
//! Loads bundled certificates and turns them into TLS client configurations
//! that trust nothing else.

mod loader;
mod pinning;

pub use loader::{
    parse_certificate, CertificateLoader, DirectoryResolver, ResourceResolver, StaticResolver,
};
pub use pinning::{PinnedCertVerifier, TrustAnchorSet, TrustContext, TrustContextBuilder};
