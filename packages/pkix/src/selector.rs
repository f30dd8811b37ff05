//! Certificate and CRL selection criteria

use std::time::SystemTime;

use crate::certificate::{
    BasicConstraints, Certificate, DistinguishedName, PublicKey, X509Crl,
};

/// Basic constraints criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicConstraintsMatch {
    /// Only end-entity certificates match
    EndEntity,
    /// Only CA certificates whose path length allows at least `n` more
    /// intermediates match
    CaWithMinPathLen(u32),
}

impl BasicConstraintsMatch {
    fn matches(self, constraints: BasicConstraints) -> bool {
        match (self, constraints) {
            (Self::EndEntity, BasicConstraints::EndEntity) => true,
            (Self::CaWithMinPathLen(_), BasicConstraints::Ca { path_len: None }) => true,
            (Self::CaWithMinPathLen(min), BasicConstraints::Ca { path_len: Some(len) }) => {
                len >= min
            }
            _ => false,
        }
    }
}

/// Target certificate constraints
///
/// Every criterion is optional; an unset criterion matches any certificate.
#[derive(Debug, Clone, Default)]
pub struct X509CertSelector {
    certificate: Option<Certificate>,
    serial_number: Option<Vec<u8>>,
    issuer: Option<DistinguishedName>,
    subject: Option<DistinguishedName>,
    subject_public_key: Option<PublicKey>,
    basic_constraints: Option<BasicConstraintsMatch>,
    certificate_valid: Option<SystemTime>,
}

impl X509CertSelector {
    /// Selector matching every certificate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require this exact certificate
    #[must_use]
    pub fn with_certificate(self, certificate: Certificate) -> Self {
        Self {
            certificate: Some(certificate),
            ..self
        }
    }

    /// Require a serial number (big-endian DER INTEGER content)
    #[must_use]
    pub fn with_serial_number(self, serial: impl Into<Vec<u8>>) -> Self {
        Self {
            serial_number: Some(serial.into()),
            ..self
        }
    }

    /// Require an issuer name
    #[must_use]
    pub fn with_issuer(self, issuer: DistinguishedName) -> Self {
        Self {
            issuer: Some(issuer),
            ..self
        }
    }

    /// Require a subject name
    #[must_use]
    pub fn with_subject(self, subject: DistinguishedName) -> Self {
        Self {
            subject: Some(subject),
            ..self
        }
    }

    /// Require a subject public key
    #[must_use]
    pub fn with_subject_public_key(self, key: PublicKey) -> Self {
        Self {
            subject_public_key: Some(key),
            ..self
        }
    }

    /// Require basic constraints
    #[must_use]
    pub fn with_basic_constraints(self, criterion: BasicConstraintsMatch) -> Self {
        Self {
            basic_constraints: Some(criterion),
            ..self
        }
    }

    /// Require the certificate to be valid at `at`
    #[must_use]
    pub fn with_certificate_valid(self, at: SystemTime) -> Self {
        Self {
            certificate_valid: Some(at),
            ..self
        }
    }

    /// Check a certificate against every set criterion
    #[must_use]
    pub fn matches(&self, cert: &Certificate) -> bool {
        self.mismatch(cert).is_none()
    }

    /// Name of the first criterion the certificate fails, if any
    #[must_use]
    pub fn mismatch(&self, cert: &Certificate) -> Option<&'static str> {
        if self.certificate.as_ref().is_some_and(|want| want != cert) {
            return Some("certificate");
        }
        if self
            .serial_number
            .as_deref()
            .is_some_and(|want| want != cert.serial_number())
        {
            return Some("serial number");
        }
        if self.issuer.as_ref().is_some_and(|want| want != cert.issuer()) {
            return Some("issuer");
        }
        if self.subject.as_ref().is_some_and(|want| want != cert.subject()) {
            return Some("subject");
        }
        if self
            .subject_public_key
            .as_ref()
            .is_some_and(|want| want != cert.public_key())
        {
            return Some("subject public key");
        }
        if self
            .basic_constraints
            .is_some_and(|want| !want.matches(cert.basic_constraints()))
        {
            return Some("basic constraints");
        }
        if self
            .certificate_valid
            .is_some_and(|at| !cert.is_valid_at(at))
        {
            return Some("certificate validity");
        }
        None
    }
}

/// CRL selection criteria
///
/// The certificate being checked is carried as context for stores and is not
/// itself a filter: a selector with only that set matches every CRL.
#[derive(Debug, Clone, Default)]
pub struct CrlSelector {
    certificate_checking: Option<Certificate>,
    issuers: Vec<DistinguishedName>,
    date: Option<SystemTime>,
}

impl CrlSelector {
    /// Selector for CRLs relevant to `certificate`
    #[must_use]
    pub fn for_certificate(certificate: Certificate) -> Self {
        Self {
            certificate_checking: Some(certificate),
            ..Self::default()
        }
    }

    /// Also accept CRLs from `issuer`
    #[must_use]
    pub fn with_issuer(mut self, issuer: DistinguishedName) -> Self {
        self.issuers.push(issuer);
        self
    }

    /// Require CRLs current at `at`
    #[must_use]
    pub fn with_date(self, at: SystemTime) -> Self {
        Self {
            date: Some(at),
            ..self
        }
    }

    /// Certificate whose revocation status is being checked
    #[must_use]
    pub fn certificate_checking(&self) -> Option<&Certificate> {
        self.certificate_checking.as_ref()
    }

    /// Check a CRL against the issuer and date criteria
    #[must_use]
    pub fn matches(&self, crl: &X509Crl) -> bool {
        let issuer_ok = self.issuers.is_empty() || self.issuers.contains(crl.issuer());
        let date_ok = self.date.map_or(true, |at| crl.is_current_at(at));
        issuer_ok && date_ok
    }
}
