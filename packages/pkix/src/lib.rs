//! PKIX certificate path validation
//!
//! Validates an X.509 certificate chain (leaf first) against caller-supplied
//! trust anchors, target constraints, registered checkers and CRL stores,
//! delegating signature, validity and revocation checks to a pluggable
//! verification engine.
//!
//! ```no_run
//! use cryypt_pkix::{CertPath, Certificate, PkixCertPathValidator, PkixParameters, TrustAnchor};
//!
//! # fn run(leaf_pem: &str, root_pem: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let path = CertPath::new(vec![Certificate::from_pem(leaf_pem)?]);
//! let params = PkixParameters::new([TrustAnchor::from_certificate(Certificate::from_pem(root_pem)?)])
//!     .with_revocation_enabled(false);
//!
//! let result = PkixCertPathValidator::new().validate(&path, &params)?;
//! println!("anchor: {:?}", result.trust_anchor().map(|a| a.subject().to_string()));
//! # Ok(())
//! # }
//! ```

pub mod anchor;
pub mod certificate;
pub mod checker;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod selector;
pub mod store;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use anchor::TrustAnchor;
pub use certificate::{
    BasicConstraints, CertPath, CertPathEncoding, Certificate, Crl, DistinguishedName, KeyUsage,
    PublicKey, X509Crl,
};
pub use checker::{CertPathChecker, FnChecker};
pub use config::{MissingCrlPolicy, ValidatorConfig};
pub use engine::{
    CertManager, CertManagerConfig, CertManagerEngine, RevocationOptions, VerificationContext,
    VerificationEngine,
};
pub use error::{
    CertStoreError, CertificateError, CheckerError, ConfigError, EngineError, Result,
    ValidationError, ValidationStage,
};
pub use params::{CertPathParameters, PkixParameters};
pub use selector::{BasicConstraintsMatch, CrlSelector, X509CertSelector};
pub use store::{CertStore, CollectionCertStore};
pub use validator::{PkixCertPathValidator, PkixValidationResult};
