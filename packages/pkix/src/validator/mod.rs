//! PKIX certificate path validator
//!
//! Validation runs as a single linear pipeline:
//! - `sanitize`: parameter kind, path type/encoding and unsupported options
//! - `constraints` / `checkers`: policy rejection, target constraints and
//!   registered checkers, before any trust material is touched
//! - `trust`: context creation and trust anchor loading
//! - `revocation`: CRL checking and CRL loading
//! - `chain`: top-down verification with CA promotion
//! - `resolver`: trust anchor resolution in a scratch context
//!
//! Every context is owned by the call that created it and released on every
//! exit path.

mod chain;
mod checkers;
mod constraints;
mod resolver;
mod result;
mod revocation;
mod sanitize;
mod trust;

use tracing::{debug, info};

use crate::certificate::CertPath;
use crate::config::ValidatorConfig;
use crate::engine::{CertManagerEngine, VerificationEngine};
use crate::error::{Result, ValidationError};
use crate::params::CertPathParameters;

pub use result::PkixValidationResult;

/// Validates X.509 certificate paths against PKIX parameters
///
/// The validator holds no per-call state and can be shared across threads;
/// each `validate` call owns its verification contexts.
#[derive(Debug)]
pub struct PkixCertPathValidator<E = CertManagerEngine> {
    engine: E,
    config: ValidatorConfig,
}

impl PkixCertPathValidator<CertManagerEngine> {
    /// Validator backed by the built-in engine
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(CertManagerEngine::new())
    }
}

impl Default for PkixCertPathValidator<CertManagerEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: VerificationEngine> PkixCertPathValidator<E> {
    /// Validator backed by the given engine
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            config: ValidatorConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(self, config: ValidatorConfig) -> Self {
        Self { config, ..self }
    }

    /// Verification engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Configuration
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `path` (leaf first) against `params`
    ///
    /// # Errors
    ///
    /// Returns the first failure of the pipeline; see `ValidationError::stage`.
    pub fn validate(
        &self,
        path: &CertPath,
        params: &dyn CertPathParameters,
    ) -> Result<PkixValidationResult> {
        let params = sanitize::parameters(params)?;
        sanitize::path(path, &self.config)?;
        sanitize::options(params, &self.engine, &self.config)?;
        debug!("Validating certificate path of {} certificates", path.len());

        constraints::check_policies(params)?;
        constraints::check_certificates(path, params)?;

        let (leaf, top) = match (path.leaf(), path.top()) {
            (Some(leaf), Some(top)) => (leaf, top),
            _ => {
                return Err(ValidationError::invalid_parameters(
                    "no certificates in certificate path",
                ))
            }
        };

        let mut context = trust::load_anchors(&self.engine, params)?;
        revocation::load_crls(&self.engine, &mut *context, path, params, &self.config)?;
        chain::verify_chain(&mut *context, path)?;
        drop(context);

        let anchor = resolver::resolve_anchor(&self.engine, top, params.trust_anchors())?;
        match &anchor {
            Some(anchor) => info!(
                "Certificate path for {} validated against {}",
                leaf.subject(),
                anchor.subject()
            ),
            None => info!(
                "Certificate path for {} validated without a resolvable anchor",
                leaf.subject()
            ),
        }

        Ok(PkixValidationResult::new(anchor, leaf.public_key().clone()))
    }
}
