//! Certificate chains and their PkiPath encoding

use std::fmt;

use der::{Decode, Encode, Header, Reader, SliceReader, Tag};

use super::Certificate;
use crate::error::CertificateError;

/// Certificate type of paths built from X.509 certificates
pub const X509_CERT_TYPE: &str = "X.509";

/// Encodings a certificate path can be serialized to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertPathEncoding {
    /// `SEQUENCE OF Certificate`, trust-anchor side first
    PkiPath,
    /// PKCS#7 `SignedData` bundle
    Pkcs7,
    /// Any other named encoding
    Other(String),
}

impl CertPathEncoding {
    /// Standard encoding name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::PkiPath => "PkiPath",
            Self::Pkcs7 => "PKCS7",
            Self::Other(name) => name,
        }
    }
}

/// Ordered certificate chain
///
/// Index 0 is the leaf (target) certificate and the last element is the
/// top-most certificate, which is issued by a trust anchor but is not the
/// anchor itself.
#[derive(Clone, PartialEq, Eq)]
pub struct CertPath {
    cert_type: String,
    certificates: Vec<Certificate>,
    encodings: Vec<CertPathEncoding>,
}

impl CertPath {
    /// X.509 path supporting the PkiPath encoding
    #[must_use]
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self {
            cert_type: X509_CERT_TYPE.to_string(),
            certificates,
            encodings: vec![CertPathEncoding::PkiPath],
        }
    }

    /// Path with an explicit certificate type and encoding list, as produced by
    /// foreign path factories
    #[must_use]
    pub fn with_type(
        cert_type: impl Into<String>,
        certificates: Vec<Certificate>,
        encodings: Vec<CertPathEncoding>,
    ) -> Self {
        Self {
            cert_type: cert_type.into(),
            certificates,
            encodings,
        }
    }

    /// Decode a PkiPath (`SEQUENCE OF Certificate`, top-most first) into a
    /// leaf-first path
    pub fn from_pki_path(encoded: &[u8]) -> Result<Self, CertificateError> {
        let mut reader = SliceReader::new(encoded)?;
        let header = Header::decode(&mut reader)?;
        header.tag.assert_eq(Tag::Sequence)?;
        let body = reader.read_slice(header.length)?;
        if !reader.is_finished() {
            return Err(CertificateError::Encoding(
                "trailing data after PkiPath".to_string(),
            ));
        }

        let mut inner = SliceReader::new(body)?;
        let mut certificates = Vec::new();
        while !inner.is_finished() {
            let element = inner.peek_header()?;
            let header_len: usize = element.encoded_len()?.try_into()?;
            let content_len: usize = element.length.try_into()?;
            let tlv = inner.read_slice(der::Length::try_from(header_len + content_len)?)?;
            certificates.push(Certificate::from_der(tlv)?);
        }

        certificates.reverse();
        Ok(Self::new(certificates))
    }

    /// Encode the path in the requested encoding
    pub fn encoded(&self, encoding: &CertPathEncoding) -> Result<Vec<u8>, CertificateError> {
        match encoding {
            CertPathEncoding::PkiPath => self.to_pki_path(),
            other => Err(CertificateError::UnsupportedEncoding(
                other.name().to_string(),
            )),
        }
    }

    /// PkiPath encoding: the certificates top-most first inside a DER SEQUENCE
    pub fn to_pki_path(&self) -> Result<Vec<u8>, CertificateError> {
        let body: Vec<u8> = self
            .certificates
            .iter()
            .rev()
            .flat_map(|cert| cert.der().iter().copied())
            .collect();

        let header = Header::new(Tag::Sequence, body.len())?;
        let mut out = Vec::with_capacity(body.len() + 8);
        header.encode_to_vec(&mut out)?;
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Declared certificate type
    #[must_use]
    pub fn cert_type(&self) -> &str {
        &self.cert_type
    }

    /// Supported encodings
    #[must_use]
    pub fn encodings(&self) -> &[CertPathEncoding] {
        &self.encodings
    }

    /// Whether the path can be encoded as `encoding`
    #[must_use]
    pub fn supports(&self, encoding: &CertPathEncoding) -> bool {
        self.encodings.contains(encoding)
    }

    /// Certificates, leaf first
    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Number of certificates
    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Whether the path holds no certificates
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// Leaf (target) certificate
    #[must_use]
    pub fn leaf(&self) -> Option<&Certificate> {
        self.certificates.first()
    }

    /// Top-most certificate, issued by a trust anchor
    #[must_use]
    pub fn top(&self) -> Option<&Certificate> {
        self.certificates.last()
    }
}

impl fmt::Debug for CertPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subjects: Vec<String> = self
            .certificates
            .iter()
            .map(|cert| cert.subject().to_string())
            .collect();
        f.debug_struct("CertPath")
            .field("type", &self.cert_type)
            .field("certificates", &subjects)
            .field("encodings", &self.encodings)
            .finish()
    }
}
