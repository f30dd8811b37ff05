//! Certificate and CRL stores

use std::sync::Arc;

use crate::certificate::{Certificate, Crl};
use crate::error::CertStoreError;
use crate::selector::{CrlSelector, X509CertSelector};

/// Source of CRLs and auxiliary certificates
pub trait CertStore: Send + Sync {
    /// Store name for diagnostics
    fn name(&self) -> &str {
        "cert-store"
    }

    /// CRLs matching the selector
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn crls(&self, selector: &CrlSelector) -> Result<Vec<Crl>, CertStoreError>;

    /// Certificates matching the selector
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn certificates(&self, selector: &X509CertSelector) -> Result<Vec<Certificate>, CertStoreError>;
}

impl<T: CertStore + ?Sized> CertStore for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn crls(&self, selector: &CrlSelector) -> Result<Vec<Crl>, CertStoreError> {
        (**self).crls(selector)
    }

    fn certificates(&self, selector: &X509CertSelector) -> Result<Vec<Certificate>, CertStoreError> {
        (**self).certificates(selector)
    }
}

/// In-memory store over fixed collections
#[derive(Debug, Clone, Default)]
pub struct CollectionCertStore {
    certificates: Vec<Certificate>,
    crls: Vec<Crl>,
}

impl CollectionCertStore {
    /// Store over the given certificates and CRLs
    #[must_use]
    pub fn new(certificates: Vec<Certificate>, crls: Vec<Crl>) -> Self {
        Self { certificates, crls }
    }

    /// Store holding only CRLs
    #[must_use]
    pub fn with_crls(crls: impl IntoIterator<Item = Crl>) -> Self {
        Self {
            certificates: Vec::new(),
            crls: crls.into_iter().collect(),
        }
    }
}

impl CertStore for CollectionCertStore {
    fn name(&self) -> &str {
        "collection"
    }

    fn crls(&self, selector: &CrlSelector) -> Result<Vec<Crl>, CertStoreError> {
        Ok(self
            .crls
            .iter()
            .filter(|crl| crl.as_x509().is_some_and(|x509| selector.matches(x509)))
            .cloned()
            .collect())
    }

    fn certificates(&self, selector: &X509CertSelector) -> Result<Vec<Certificate>, CertStoreError> {
        Ok(self
            .certificates
            .iter()
            .filter(|cert| selector.matches(cert))
            .cloned()
            .collect())
    }
}
