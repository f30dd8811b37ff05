//! Trust anchors

use crate::certificate::{Certificate, DistinguishedName, PublicKey};

/// Most-trusted CA used to terminate a certificate path
///
/// Anchors are shared with the validation result through `Arc` and are never
/// modified by a verification engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustAnchor {
    /// A trusted CA certificate
    Certificate(Certificate),
    /// A CA name and key without a certificate
    ///
    /// Engines load trusted roots as certificates, so these anchors are
    /// skipped when populating a verification context.
    NamedKey {
        /// CA subject name
        name: DistinguishedName,
        /// CA public key
        public_key: PublicKey,
    },
}

impl TrustAnchor {
    /// Anchor backed by a trusted certificate
    #[must_use]
    pub fn from_certificate(certificate: Certificate) -> Self {
        Self::Certificate(certificate)
    }

    /// Anchor given by name and key only
    #[must_use]
    pub fn from_name_and_key(name: DistinguishedName, public_key: PublicKey) -> Self {
        Self::NamedKey { name, public_key }
    }

    /// Trusted certificate, if the anchor has one
    #[must_use]
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Certificate(cert) => Some(cert),
            Self::NamedKey { .. } => None,
        }
    }

    /// CA subject name
    #[must_use]
    pub fn subject(&self) -> &DistinguishedName {
        match self {
            Self::Certificate(cert) => cert.subject(),
            Self::NamedKey { name, .. } => name,
        }
    }

    /// CA public key
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        match self {
            Self::Certificate(cert) => cert.public_key(),
            Self::NamedKey { public_key, .. } => public_key,
        }
    }
}

impl From<Certificate> for TrustAnchor {
    fn from(certificate: Certificate) -> Self {
        Self::Certificate(certificate)
    }
}
