//! CRL loading

use tracing::debug;

use crate::certificate::{CertPath, Crl};
use crate::config::ValidatorConfig;
use crate::engine::{RevocationOptions, VerificationContext, VerificationEngine};
use crate::error::{EngineError, Result, ValidationError, ValidationStage};
use crate::params::PkixParameters;
use crate::selector::CrlSelector;

/// Enable revocation checking and load CRLs from every store
///
/// Must run after the trust anchors are loaded: engines verify each CRL
/// against the loaded roots. Returns the number of CRLs loaded; finding none
/// is not an error.
pub(crate) fn load_crls<E: VerificationEngine>(
    engine: &E,
    context: &mut E::Context,
    path: &CertPath,
    params: &PkixParameters,
    config: &ValidatorConfig,
) -> Result<usize> {
    if !params.is_revocation_enabled() {
        debug!("Revocation checking disabled");
        return Ok(0);
    }

    if !engine.crl_supported() {
        return Err(unsupported());
    }

    let options = RevocationOptions {
        missing_crl: config.missing_crl,
    };
    context.enable_revocation(options).map_err(|source| match source {
        EngineError::CrlUnsupported => unsupported(),
        other => ValidationError::CrlLoadFailure {
            reason: "enabling CRL checking".to_string(),
            source: Box::new(other),
        },
    })?;

    let Some(leaf) = path.leaf() else {
        return Ok(0);
    };
    let selector = CrlSelector::for_certificate(leaf.clone());

    let mut loaded = 0usize;
    for store in params.cert_stores() {
        let crls = store
            .crls(&selector)
            .map_err(|source| ValidationError::CrlLoadFailure {
                reason: format!("reading CRLs from store '{}'", store.name()),
                source: Box::new(source),
            })?;

        for crl in &crls {
            match crl {
                Crl::X509(x509) => {
                    context
                        .load_crl(x509.der())
                        .map_err(|source| ValidationError::CrlLoadFailure {
                            reason: format!("loading CRL issued by {}", x509.issuer()),
                            source: Box::new(source),
                        })?;
                    loaded += 1;
                }
                Crl::Unsupported { crl_type } => {
                    debug!("Skipping CRL of type {crl_type}");
                }
            }
        }
    }

    debug!(
        "Loaded {loaded} CRLs from {} stores",
        params.cert_stores().len()
    );
    Ok(loaded)
}

fn unsupported() -> ValidationError {
    ValidationError::unsupported(
        ValidationStage::RevocationLoading,
        "CRL revocation checking is not available in this engine",
    )
}
