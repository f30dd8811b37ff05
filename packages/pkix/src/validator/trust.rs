//! Trust store loading

use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::{ScopedContext, VerificationContext, VerificationEngine};
use crate::error::{Result, ValidationError, ValidationStage};
use crate::params::PkixParameters;

/// Create the validation context and load every trust anchor into it
///
/// Loading is all-or-nothing: the first anchor the engine rejects fails the
/// call and the context is released.
pub(crate) fn load_anchors<E: VerificationEngine>(
    engine: &E,
    params: &PkixParameters,
) -> Result<ScopedContext<E::Context>> {
    let anchors = params.trust_anchors();
    if anchors.is_empty() {
        return Err(ValidationError::NoTrustAnchors);
    }

    let mut context = ScopedContext::acquire(engine, "validation").map_err(|source| {
        ValidationError::NativeResourceFailure {
            stage: ValidationStage::TrustLoading,
            source,
        }
    })?;

    let mut loaded = 0usize;
    for anchor in anchors {
        let Some(cert) = anchor.certificate() else {
            warn!("Skipping trust anchor {} without a certificate", anchor.subject());
            continue;
        };

        context
            .load_trusted_root(cert.der())
            .map_err(|source| ValidationError::TrustLoadFailure {
                anchor: Arc::clone(anchor),
                source,
            })?;
        loaded += 1;
    }

    debug!("Loaded {loaded} of {} trust anchors", anchors.len());
    Ok(context)
}
