//! Caller-registered certificate path checkers

use std::fmt;
use std::sync::Arc;

use crate::certificate::Certificate;
use crate::error::CheckerError;

/// Additional check applied to every certificate in a path
///
/// Checkers run leaf first, in registration order, before any trust material
/// is loaded. A checker that keeps state across calls must synchronise it
/// itself.
pub trait CertPathChecker: Send + Sync {
    /// Checker name used in diagnostics
    fn name(&self) -> &str;

    /// Inspect one certificate
    ///
    /// # Errors
    ///
    /// Returns an error to reject the certificate and fail validation.
    fn check(&self, certificate: &Certificate) -> Result<(), CheckerError>;
}

impl<T: CertPathChecker + ?Sized> CertPathChecker for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn check(&self, certificate: &Certificate) -> Result<(), CheckerError> {
        (**self).check(certificate)
    }
}

/// Checker backed by a closure
pub struct FnChecker<F> {
    name: String,
    check: F,
}

impl<F> FnChecker<F>
where
    F: Fn(&Certificate) -> Result<(), CheckerError> + Send + Sync,
{
    /// Wrap a closure under a diagnostic name
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> CertPathChecker for FnChecker<F>
where
    F: Fn(&Certificate) -> Result<(), CheckerError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, certificate: &Certificate) -> Result<(), CheckerError> {
        (self.check)(certificate)
    }
}

impl<F> fmt::Debug for FnChecker<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnChecker").field("name", &self.name).finish()
    }
}
