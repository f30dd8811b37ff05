//! Verification engine abstraction
//!
//! An engine hands out per-call verification contexts that hold trusted roots
//! and CRLs and verify single certificates against them. Contexts are released
//! when dropped.
//!
//! This module contains:
//! - `VerificationEngine` / `VerificationContext`: the engine seam
//! - `ScopedContext`: guard that logs acquisition and release
//! - `cert_manager`: the built-in x509-parser backed engine

pub mod cert_manager;

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::config::MissingCrlPolicy;
use crate::error::EngineError;

pub use cert_manager::{CertManager, CertManagerConfig, CertManagerEngine};

/// Revocation settings applied to a context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevocationOptions {
    /// Behaviour when no CRL from the issuer is loaded
    pub missing_crl: MissingCrlPolicy,
}

/// Source of verification contexts
pub trait VerificationEngine: Send + Sync {
    /// Context type handed out per validation call
    type Context: VerificationContext;

    /// Provider name, checked against the requested signature provider in FIPS
    /// mode
    fn provider_name(&self) -> &str;

    /// Whether contexts support CRL-based revocation checking
    fn crl_supported(&self) -> bool;

    /// Allocate a fresh, empty context
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot allocate a context.
    fn create_context(&self) -> Result<Self::Context, EngineError>;
}

/// Per-call verification state; dropping it releases the engine resources
pub trait VerificationContext {
    /// Trust a CA certificate
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate cannot be used as a root.
    fn load_trusted_root(&mut self, der: &[u8]) -> Result<(), EngineError>;

    /// Forget every trusted root
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot reset its root set.
    fn unload_trusted_roots(&mut self) -> Result<(), EngineError>;

    /// Turn on CRL checking for subsequent verifications
    ///
    /// # Errors
    ///
    /// Returns an error if revocation checking is unavailable.
    fn enable_revocation(&mut self, options: RevocationOptions) -> Result<(), EngineError>;

    /// Load a CRL, verifying it against the loaded roots
    ///
    /// # Errors
    ///
    /// Returns an error if the CRL is malformed or no loaded root signed it.
    fn load_crl(&mut self, der: &[u8]) -> Result<(), EngineError>;

    /// Verify a certificate against the loaded roots and CRLs
    ///
    /// # Errors
    ///
    /// Returns an error describing why the certificate is not trusted.
    fn verify(&mut self, der: &[u8]) -> Result<(), EngineError>;
}

/// Exclusively owned context that is released on every exit path
pub(crate) struct ScopedContext<C: VerificationContext> {
    context: C,
    purpose: &'static str,
}

impl<C: VerificationContext> ScopedContext<C> {
    pub(crate) fn acquire<E>(engine: &E, purpose: &'static str) -> Result<Self, EngineError>
    where
        E: VerificationEngine<Context = C> + ?Sized,
    {
        let context = engine.create_context()?;
        debug!("Acquired {purpose} verification context from {}", engine.provider_name());
        Ok(Self { context, purpose })
    }
}

impl<C: VerificationContext> Deref for ScopedContext<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.context
    }
}

impl<C: VerificationContext> DerefMut for ScopedContext<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.context
    }
}

impl<C: VerificationContext> Drop for ScopedContext<C> {
    fn drop(&mut self) {
        debug!("Releasing {} verification context", self.purpose);
    }
}
