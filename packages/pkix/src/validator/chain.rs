//! Top-down chain verification

use cryypt_common::LoggingTransformer;
use tracing::debug;

use crate::certificate::CertPath;
use crate::engine::VerificationContext;
use crate::error::{Result, ValidationError};

/// Verify from the top-most certificate down to the leaf
///
/// Each verified CA below the top is promoted to a trusted root so the next
/// certificate down can chain to it. Promotion failures are tolerated; the
/// first verification failure stops the walk.
pub(crate) fn verify_chain<C: VerificationContext>(context: &mut C, path: &CertPath) -> Result<()> {
    for (index, cert) in path.certificates().iter().enumerate().rev() {
        if let Err(source) = context.verify(cert.der()) {
            LoggingTransformer::log_certificate_rejected("chain verification", index, cert.der(), &source);
            return Err(ValidationError::VerificationFailure {
                index,
                path: Box::new(path.clone()),
                source,
            });
        }
        debug!("Verified certificate {index}: {}", cert.subject());

        if index > 0 && cert.basic_constraints().is_ca() {
            if let Err(e) = context.load_trusted_root(cert.der()) {
                debug!("Certificate {index} not promoted to trusted root: {e}");
            }
        }
    }
    Ok(())
}
