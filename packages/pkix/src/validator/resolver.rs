//! Trust anchor resolution

use std::sync::Arc;

use tracing::debug;

use crate::anchor::TrustAnchor;
use crate::certificate::Certificate;
use crate::engine::{ScopedContext, VerificationContext, VerificationEngine};
use crate::error::{Result, ValidationError, ValidationStage};

/// Find the anchor that issued and signed the top-most certificate
///
/// Candidates are anchors whose subject equals the certificate's issuer. Each
/// is tried alone in a scratch context; the first one whose key verifies the
/// certificate wins.
pub(crate) fn resolve_anchor<E: VerificationEngine>(
    engine: &E,
    top: &Certificate,
    anchors: &[Arc<TrustAnchor>],
) -> Result<Option<Arc<TrustAnchor>>> {
    let resource_failure = |source| ValidationError::NativeResourceFailure {
        stage: ValidationStage::AnchorResolution,
        source,
    };
    let mut scratch = ScopedContext::acquire(engine, "anchor resolution").map_err(resource_failure)?;

    for anchor in anchors.iter().filter(|anchor| anchor.subject() == top.issuer()) {
        let Some(cert) = anchor.certificate() else {
            debug!("Anchor {} has no certificate to verify with", anchor.subject());
            continue;
        };

        scratch.unload_trusted_roots().map_err(resource_failure)?;
        if let Err(e) = scratch.load_trusted_root(cert.der()) {
            debug!("Anchor {} could not be loaded: {e}", anchor.subject());
            continue;
        }

        match scratch.verify(top.der()) {
            Ok(()) => {
                debug!("Resolved trust anchor {}", anchor.subject());
                return Ok(Some(Arc::clone(anchor)));
            }
            Err(e) => debug!("Anchor {} does not verify {}: {e}", anchor.subject(), top.subject()),
        }
    }

    Ok(None)
}
