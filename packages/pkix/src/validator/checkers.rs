//! Registered checker invocation

use std::sync::Arc;

use cryypt_common::LoggingTransformer;

use crate::certificate::Certificate;
use crate::checker::CertPathChecker;
use crate::error::{Result, ValidationError};

/// Run every checker on one certificate, in registration order
pub(crate) fn invoke(
    index: usize,
    cert: &Certificate,
    checkers: &[Arc<dyn CertPathChecker>],
) -> Result<()> {
    for checker in checkers {
        if let Err(source) = checker.check(cert) {
            LoggingTransformer::log_certificate_rejected(checker.name(), index, cert.der(), &source);
            return Err(ValidationError::CheckerRejected {
                index,
                checker: checker.name().to_string(),
                source,
            });
        }
    }
    Ok(())
}
