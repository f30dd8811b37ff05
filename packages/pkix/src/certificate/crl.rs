//! Certificate revocation lists

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use x509_parser::prelude::*;

use super::parser::name_of;
use super::{unix_seconds, DistinguishedName};
use crate::error::CertificateError;

struct CrlInner {
    der: Vec<u8>,
    issuer: DistinguishedName,
    this_update: i64,
    next_update: Option<i64>,
    revoked: Vec<Vec<u8>>,
}

/// Parsed X.509 CRL
#[derive(Clone)]
pub struct X509Crl {
    inner: Arc<CrlInner>,
}

impl X509Crl {
    /// Parse a DER-encoded CRL
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CertificateError> {
        let der = der.into();
        let (issuer, this_update, next_update, revoked) = {
            let (_, crl) = CertificateRevocationList::from_der(&der)
                .map_err(|e| CertificateError::CrlParse(e.to_string()))?;
            let revoked = crl
                .iter_revoked_certificates()
                .map(|entry| entry.raw_serial().to_vec())
                .collect();
            (
                name_of(crl.issuer()),
                crl.last_update().timestamp(),
                crl.next_update().map(|t| t.timestamp()),
                revoked,
            )
        };

        Ok(Self {
            inner: Arc::new(CrlInner {
                der,
                issuer,
                this_update,
                next_update,
                revoked,
            }),
        })
    }

    /// Parse the first `X509 CRL` block of a PEM document
    pub fn from_pem(pem: &str) -> Result<Self, CertificateError> {
        let block = ::pem::parse_many(pem)?
            .into_iter()
            .find(|block| block.tag() == "X509 CRL")
            .ok_or_else(|| CertificateError::CrlParse("no X509 CRL block found".to_string()))?;
        Self::from_der(block.into_contents())
    }

    /// DER encoding
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.inner.der
    }

    /// Issuer name
    #[must_use]
    pub fn issuer(&self) -> &DistinguishedName {
        &self.inner.issuer
    }

    /// Whether a certificate serial is listed
    #[must_use]
    pub fn is_revoked(&self, serial: &[u8]) -> bool {
        self.inner.revoked.iter().any(|entry| entry == serial)
    }

    /// Number of revoked entries
    #[must_use]
    pub fn revoked_count(&self) -> usize {
        self.inner.revoked.len()
    }

    /// Whether `at` falls between this update and next update
    #[must_use]
    pub fn is_current_at(&self, at: SystemTime) -> bool {
        let at = unix_seconds(at);
        self.inner.this_update <= at && self.inner.next_update.map_or(true, |next| at <= next)
    }
}

impl fmt::Debug for X509Crl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Crl")
            .field("issuer", &self.inner.issuer)
            .field("revoked", &self.inner.revoked.len())
            .finish()
    }
}

/// CRL as returned by a certificate store
#[derive(Debug, Clone)]
pub enum Crl {
    /// X.509 CRL, the only kind the validator loads
    X509(X509Crl),
    /// CRL of another type, skipped during loading
    Unsupported {
        /// Declared CRL type
        crl_type: String,
    },
}

impl Crl {
    /// The X.509 CRL, if this is one
    #[must_use]
    pub fn as_x509(&self) -> Option<&X509Crl> {
        match self {
            Self::X509(crl) => Some(crl),
            Self::Unsupported { .. } => None,
        }
    }

    /// Declared type name
    #[must_use]
    pub fn crl_type(&self) -> &str {
        match self {
            Self::X509(_) => "X.509",
            Self::Unsupported { crl_type } => crl_type,
        }
    }
}

impl From<X509Crl> for Crl {
    fn from(crl: X509Crl) -> Self {
        Self::X509(crl)
    }
}
