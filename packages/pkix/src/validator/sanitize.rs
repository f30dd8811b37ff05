//! Parameter, path and option sanitization

use tracing::debug;

use crate::certificate::{CertPath, CertPathEncoding, X509_CERT_TYPE};
use crate::config::ValidatorConfig;
use crate::engine::VerificationEngine;
use crate::error::{Result, ValidationError, ValidationStage};
use crate::params::{CertPathParameters, PkixParameters};

/// Downcast to PKIX parameters
pub(crate) fn parameters(params: &dyn CertPathParameters) -> Result<&PkixParameters> {
    params
        .as_any()
        .downcast_ref::<PkixParameters>()
        .ok_or_else(|| ValidationError::invalid_parameters("parameters must be PkixParameters"))
}

/// Check path type, encoding support and length
pub(crate) fn path(path: &CertPath, config: &ValidatorConfig) -> Result<()> {
    if path.cert_type() != X509_CERT_TYPE {
        return Err(ValidationError::invalid_parameters(format!(
            "certificate path type must be {X509_CERT_TYPE}, got {}",
            path.cert_type()
        )));
    }

    if !path.supports(&CertPathEncoding::PkiPath) {
        return Err(ValidationError::EncodingUnsupported(
            "certificate path does not support PkiPath encoding".to_string(),
        ));
    }

    if path.is_empty() {
        return Err(ValidationError::invalid_parameters(
            "no certificates in certificate path",
        ));
    }

    if let Some(max) = config.max_chain_length {
        if path.len() > max {
            return Err(ValidationError::invalid_parameters(format!(
                "certificate path of {} certificates exceeds limit of {max}",
                path.len()
            )));
        }
    }

    Ok(())
}

/// Reject options the validator cannot honour
pub(crate) fn options<E>(params: &PkixParameters, engine: &E, config: &ValidatorConfig) -> Result<()>
where
    E: VerificationEngine + ?Sized,
{
    if params.date().is_some() {
        return Err(ValidationError::unsupported(
            ValidationStage::Parameters,
            "validation at a fixed date; certificates are checked against the current time",
        ));
    }

    if config.fips_mode {
        match params.sig_provider() {
            Some(provider) if provider != engine.provider_name() => {
                return Err(ValidationError::invalid_parameters(format!(
                    "FIPS mode requires signature provider '{}', got '{provider}'",
                    engine.provider_name()
                )));
            }
            Some(_) => {}
            None => debug!(
                "No signature provider requested, using {}",
                engine.provider_name()
            ),
        }
    }

    Ok(())
}
