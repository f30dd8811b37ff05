//! Policy options and per-certificate constraints

use tracing::{debug, warn};

use super::checkers;
use crate::certificate::{CertPath, Certificate};
use crate::error::{Result, ValidationError, ValidationStage};
use crate::params::PkixParameters;
use crate::selector::X509CertSelector;

/// Reject certificate policy processing requests
///
/// Policy state does not depend on the chain, so this runs once ahead of the
/// per-certificate loop.
pub(crate) fn check_policies(params: &PkixParameters) -> Result<()> {
    if !params.initial_policies().is_empty() {
        return Err(ValidationError::unsupported(
            ValidationStage::ChainSanitization,
            "certificate policy processing (initial policies set)",
        ));
    }
    if params.is_any_policy_inhibited() {
        return Err(ValidationError::unsupported(
            ValidationStage::ChainSanitization,
            "any-policy inhibition",
        ));
    }
    if params.is_explicit_policy_required() {
        return Err(ValidationError::unsupported(
            ValidationStage::ChainSanitization,
            "explicit policy requirement",
        ));
    }

    if params.is_policy_mapping_inhibited() {
        debug!("Policy mapping inhibited; ignored without policy processing");
    }
    if params.is_policy_qualifiers_rejected() {
        debug!("Policy qualifiers rejected; ignored without policy processing");
    }
    Ok(())
}

/// Apply target constraints and registered checkers, leaf first
pub(crate) fn check_certificates(path: &CertPath, params: &PkixParameters) -> Result<()> {
    for (index, cert) in path.certificates().iter().enumerate() {
        debug!(
            "Checking certificate {index}: {} ({})",
            cert.subject(),
            cert.fingerprint()
        );

        if index == 0 {
            check_target(cert, params.target_constraints())?;
        }
        checkers::invoke(index, cert, params.cert_path_checkers())?;
    }
    Ok(())
}

fn check_target(cert: &Certificate, selector: Option<&X509CertSelector>) -> Result<()> {
    let Some(selector) = selector else {
        return Ok(());
    };

    match selector.mismatch(cert) {
        None => Ok(()),
        Some(criterion) => {
            warn!(
                "Target certificate {} does not match {criterion} constraint",
                cert.subject()
            );
            Err(ValidationError::CertificateRejected {
                index: 0,
                reason: format!("target certificate does not match {criterion} constraint"),
            })
        }
    }
}
