//! Error types for certificate path validation

use std::sync::Arc;

use crate::anchor::TrustAnchor;
use crate::certificate::CertPath;

/// Result type for path validation
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Pipeline stage a validation failure was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    /// Parameter kind, path type/encoding and unsupported-option checks
    Parameters,
    /// Per-certificate target constraints and registered checkers
    ChainSanitization,
    /// Creating the verification context and loading trust anchors
    TrustLoading,
    /// Enabling revocation checking and loading CRLs
    RevocationLoading,
    /// Verifying the chain from the top-most certificate down to the leaf
    ChainVerification,
    /// Resolving which trust anchor issued the top-most certificate
    AnchorResolution,
}

impl std::fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Parameters => "parameter validation",
            Self::ChainSanitization => "chain sanitization",
            Self::TrustLoading => "trust loading",
            Self::RevocationLoading => "revocation loading",
            Self::ChainVerification => "chain verification",
            Self::AnchorResolution => "anchor resolution",
        };
        f.write_str(name)
    }
}

/// Certificate path validation failure
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Parameters are of the wrong kind or the path is malformed
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// The path does not support the PkiPath encoding
    #[error("Unsupported certificate path encoding: {0}")]
    EncodingUnsupported(String),

    /// A requested option is not supported by this validator or engine
    #[error("Unsupported feature during {stage}: {feature}")]
    UnsupportedFeature {
        /// Stage that rejected the option
        stage: ValidationStage,
        /// Description of the rejected option
        feature: String,
    },

    /// Certificate did not satisfy the target constraints
    #[error("Certificate {index} rejected: {reason}")]
    CertificateRejected {
        /// Position of the certificate in the path
        index: usize,
        /// Why the certificate was rejected
        reason: String,
    },

    /// A registered path checker rejected a certificate
    #[error("Certificate {index} rejected by checker '{checker}': {source}")]
    CheckerRejected {
        /// Position of the certificate in the path
        index: usize,
        /// Name of the rejecting checker
        checker: String,
        /// The checker's own error
        #[source]
        source: CheckerError,
    },

    /// The parameters hold no trust anchors
    #[error("No trust anchors configured")]
    NoTrustAnchors,

    /// A trust anchor could not be loaded into the verification context
    #[error("Failed to load trust anchor '{}': {source}", .anchor.subject())]
    TrustLoadFailure {
        /// The anchor that failed to load
        anchor: Arc<TrustAnchor>,
        /// Engine failure
        #[source]
        source: EngineError,
    },

    /// A CRL store failed or the engine rejected a CRL
    #[error("Failed to load CRLs: {reason}")]
    CrlLoadFailure {
        /// What was being loaded
        reason: String,
        /// Store or engine failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The engine rejected a certificate in the path
    #[error("Certificate {index} failed verification: {source}")]
    VerificationFailure {
        /// Position of the rejected certificate
        index: usize,
        /// The full path, for diagnostics
        path: Box<CertPath>,
        /// Engine failure
        #[source]
        source: EngineError,
    },

    /// The engine could not provide or reset a verification context
    #[error("Verification engine resource failure during {stage}: {source}")]
    NativeResourceFailure {
        /// Stage that needed the resource
        stage: ValidationStage,
        /// Engine failure
        #[source]
        source: EngineError,
    },
}

impl ValidationError {
    /// Create an invalid-parameters error
    #[inline]
    #[must_use]
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create an unsupported-feature error for the given stage
    #[inline]
    #[must_use]
    pub fn unsupported(stage: ValidationStage, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            stage,
            feature: feature.into(),
        }
    }

    /// Stage of the pipeline that failed
    #[must_use]
    pub fn stage(&self) -> ValidationStage {
        match self {
            Self::InvalidParameters(_) | Self::EncodingUnsupported(_) => {
                ValidationStage::Parameters
            }
            Self::UnsupportedFeature { stage, .. } | Self::NativeResourceFailure { stage, .. } => {
                *stage
            }
            Self::CertificateRejected { .. } | Self::CheckerRejected { .. } => {
                ValidationStage::ChainSanitization
            }
            Self::NoTrustAnchors | Self::TrustLoadFailure { .. } => ValidationStage::TrustLoading,
            Self::CrlLoadFailure { .. } => ValidationStage::RevocationLoading,
            Self::VerificationFailure { .. } => ValidationStage::ChainVerification,
        }
    }

    /// Index of the offending certificate, when one is known
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::CertificateRejected { index, .. }
            | Self::CheckerRejected { index, .. }
            | Self::VerificationFailure { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Failure reported by a verification engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine could not allocate a context
    #[error("Engine resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Certificate bytes could not be parsed
    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),

    /// CRL bytes could not be parsed
    #[error("Malformed CRL: {0}")]
    MalformedCrl(String),

    /// A non-CA certificate was offered as a trusted root
    #[error("Certificate is not a CA and cannot be trusted as a root")]
    NotCa,

    /// Certificate validity ended before now
    #[error("Certificate has expired")]
    Expired,

    /// Certificate validity starts after now
    #[error("Certificate is not yet valid")]
    NotYetValid,

    /// No loaded root issued and signed the certificate
    #[error("No trusted signer found for issuer {issuer}")]
    NoTrustPath {
        /// Issuer of the unverifiable certificate
        issuer: String,
    },

    /// The certificate is listed in a loaded CRL
    #[error("Certificate with serial {serial} has been revoked")]
    Revoked {
        /// Hex encoded serial number
        serial: String,
    },

    /// Revocation is required but no CRL from the issuer is loaded
    #[error("No CRL loaded for issuer {issuer}")]
    CrlMissing {
        /// Issuer without a CRL
        issuer: String,
    },

    /// The issuer's CRL is past its next update time
    #[error("CRL from {issuer} is past its next update")]
    CrlExpired {
        /// Issuer of the stale CRL
        issuer: String,
    },

    /// No loaded root can vouch for the CRL
    #[error("No trusted CRL signer for issuer {issuer}")]
    CrlSignerNotFound {
        /// Issuer named by the CRL
        issuer: String,
    },

    /// Revocation checking is not available in this engine
    #[error("Revocation checking is not supported by this engine")]
    CrlUnsupported,
}

/// Certificate, CRL or path parsing and encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertificateError {
    /// DER structure could not be parsed as an X.509 certificate
    #[error("Certificate parsing failed: {0}")]
    Parse(String),

    /// DER structure could not be parsed as an X.509 CRL
    #[error("CRL parsing failed: {0}")]
    CrlParse(String),

    /// PEM armour could not be decoded
    #[error("PEM decoding failed: {0}")]
    Pem(String),

    /// Input held no certificate
    #[error("No certificate found in input")]
    NoCertificate,

    /// Path encoding is not supported
    #[error("Unsupported certificate path encoding: {0}")]
    UnsupportedEncoding(String),

    /// ASN.1 encoding or decoding failed
    #[error("ASN.1 encoding error: {0}")]
    Encoding(String),
}

impl From<der::Error> for CertificateError {
    fn from(err: der::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<pem::PemError> for CertificateError {
    fn from(err: pem::PemError) -> Self {
        Self::Pem(err.to_string())
    }
}

/// Failure of a certificate or CRL store
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertStoreError {
    /// Backing storage is unreachable
    #[error("Certificate store unavailable: {0}")]
    Unavailable(String),
}

/// Failure raised by a registered path checker
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CheckerError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CheckerError {
    /// Create a checker error with a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a checker error wrapping an underlying cause
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Checker's message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON could not be deserialized
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_stage_and_index_reporting() {
        let err = ValidationError::CertificateRejected {
            index: 0,
            reason: "target mismatch".into(),
        };
        assert_eq!(err.stage(), ValidationStage::ChainSanitization);
        assert_eq!(err.index(), Some(0));

        let err = ValidationError::unsupported(ValidationStage::RevocationLoading, "CRL");
        assert_eq!(err.stage(), ValidationStage::RevocationLoading);
        assert_eq!(err.index(), None);

        assert_eq!(
            ValidationError::NoTrustAnchors.stage(),
            ValidationStage::TrustLoading
        );
    }

    #[test]
    fn test_checker_error_preserves_cause() {
        let cause = std::io::Error::other("ocsp responder down");
        let err = ValidationError::CheckerRejected {
            index: 1,
            checker: "ocsp".into(),
            source: CheckerError::with_source("status unknown", cause),
        };

        let checker = err.source().and_then(|e| e.downcast_ref::<CheckerError>());
        let checker = checker.map(CheckerError::message);
        assert_eq!(checker, Some("status unknown"));

        let root = err.source().and_then(|e| e.source()).map(ToString::to_string);
        assert_eq!(root.as_deref(), Some("ocsp responder down"));
    }
}
