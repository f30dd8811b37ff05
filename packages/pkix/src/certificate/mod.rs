//! X.509 certificate model
//!
//! This module contains:
//! - `Certificate`: immutable DER certificate with fields extracted at parse time
//! - `CertPath`: ordered certificate chain with PkiPath encoding support
//! - `X509Crl` / `Crl`: parsed revocation lists as returned by stores
//! - `parser`: x509-parser based field extraction

pub mod crl;
pub mod parser;
pub mod path;

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CertificateError;

pub use crl::{Crl, X509Crl};
pub use path::{CertPath, CertPathEncoding, X509_CERT_TYPE};

/// Distinguished name kept as raw DER plus its display form
///
/// Equality and hashing use the DER bytes only.
#[derive(Clone)]
pub struct DistinguishedName {
    der: Vec<u8>,
    display: String,
}

impl DistinguishedName {
    pub(crate) fn new(der: Vec<u8>, display: String) -> Self {
        Self { der, display }
    }

    /// Parse a DER-encoded `Name`
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        parser::parse_name(der)
    }

    /// Raw DER encoding
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for DistinguishedName {}

impl std::hash::Hash for DistinguishedName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl fmt::Debug for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DistinguishedName({})", self.display)
    }
}

/// Subject public key of a certificate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    algorithm: String,
    spki_der: Vec<u8>,
}

impl PublicKey {
    /// Build a key from its algorithm OID (dotted form) and SubjectPublicKeyInfo DER
    #[must_use]
    pub fn new(algorithm: impl Into<String>, spki_der: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            spki_der,
        }
    }

    /// Algorithm OID in dotted form, e.g. `1.2.840.10045.2.1`
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Full SubjectPublicKeyInfo DER
    #[must_use]
    pub fn spki_der(&self) -> &[u8] {
        &self.spki_der
    }
}

/// Basic constraints as they affect path building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicConstraints {
    /// No basic constraints extension, or `cA` is false
    EndEntity,
    /// Certificate may issue other certificates
    Ca {
        /// Maximum number of intermediate CAs below this one, `None` for unlimited
        path_len: Option<u32>,
    },
}

impl BasicConstraints {
    /// Whether the certificate is a CA
    #[must_use]
    pub fn is_ca(self) -> bool {
        matches!(self, Self::Ca { .. })
    }
}

/// Key usage bits relevant to certificate and CRL signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyUsage {
    /// `keyCertSign`
    pub key_cert_sign: bool,
    /// `cRLSign`
    pub crl_sign: bool,
}

pub(crate) struct CertificateInner {
    pub(crate) der: Vec<u8>,
    pub(crate) subject: DistinguishedName,
    pub(crate) issuer: DistinguishedName,
    pub(crate) serial: Vec<u8>,
    pub(crate) public_key: PublicKey,
    pub(crate) basic_constraints: BasicConstraints,
    pub(crate) key_usage: Option<KeyUsage>,
    pub(crate) not_before: i64,
    pub(crate) not_after: i64,
}

/// Immutable X.509 certificate
///
/// Cloning is cheap; the DER and extracted fields are shared.
#[derive(Clone)]
pub struct Certificate {
    inner: Arc<CertificateInner>,
}

impl Certificate {
    /// Parse a DER-encoded certificate
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, CertificateError> {
        let inner = parser::parse_certificate(der.into())?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Parse the first `CERTIFICATE` block of a PEM document
    pub fn from_pem(pem: &str) -> Result<Self, CertificateError> {
        Self::from_pem_bundle(pem)?
            .into_iter()
            .next()
            .ok_or(CertificateError::NoCertificate)
    }

    /// Parse every `CERTIFICATE` block of a PEM document, in order
    pub fn from_pem_bundle(pem: &str) -> Result<Vec<Self>, CertificateError> {
        let blocks = pem::parse_many(pem)?;
        blocks
            .into_iter()
            .filter(|block| block.tag() == "CERTIFICATE")
            .map(|block| Self::from_der(block.into_contents()))
            .collect()
    }

    /// PEM encoding of the certificate
    #[must_use]
    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new("CERTIFICATE", self.inner.der.clone()))
    }

    /// DER encoding
    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.inner.der
    }

    /// Subject name
    #[must_use]
    pub fn subject(&self) -> &DistinguishedName {
        &self.inner.subject
    }

    /// Issuer name
    #[must_use]
    pub fn issuer(&self) -> &DistinguishedName {
        &self.inner.issuer
    }

    /// Serial number as the big-endian content bytes of the DER INTEGER
    #[must_use]
    pub fn serial_number(&self) -> &[u8] {
        &self.inner.serial
    }

    /// Subject public key
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.inner.public_key
    }

    /// Basic constraints
    #[must_use]
    pub fn basic_constraints(&self) -> BasicConstraints {
        self.inner.basic_constraints
    }

    /// Key usage bits, `None` when the extension is absent
    #[must_use]
    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.inner.key_usage
    }

    /// Whether subject and issuer are the same name
    #[must_use]
    pub fn is_self_issued(&self) -> bool {
        self.inner.subject == self.inner.issuer
    }

    /// Whether the certificate is within its validity window at `at`
    #[must_use]
    pub fn is_valid_at(&self, at: SystemTime) -> bool {
        let at = unix_seconds(at);
        self.inner.not_before <= at && at <= self.inner.not_after
    }

    /// Short SHA-256 fingerprint for log lines
    #[must_use]
    pub fn fingerprint(&self) -> String {
        cryypt_common::LoggingTransformer::fingerprint(&self.inner.der)
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.der == other.inner.der
    }
}

impl Eq for Certificate {}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.inner.subject.display)
            .field("issuer", &self.inner.issuer.display)
            .field("serial", &hex::encode(&self.inner.serial))
            .field("basic_constraints", &self.inner.basic_constraints)
            .finish()
    }
}

/// Seconds since the Unix epoch, negative before it
pub(crate) fn unix_seconds(at: SystemTime) -> i64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(before) => -i64::try_from(before.duration().as_secs()).unwrap_or(i64::MAX),
    }
}
