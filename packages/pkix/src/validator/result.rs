use std::sync::Arc;

use crate::anchor::TrustAnchor;
use crate::certificate::PublicKey;

/// Outcome of a successful validation
///
/// Certificate policy processing is not performed, so no policy tree is
/// produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkixValidationResult {
    trust_anchor: Option<Arc<TrustAnchor>>,
    public_key: PublicKey,
}

impl PkixValidationResult {
    pub(crate) fn new(trust_anchor: Option<Arc<TrustAnchor>>, public_key: PublicKey) -> Self {
        Self {
            trust_anchor,
            public_key,
        }
    }

    /// Anchor that issued the top-most certificate
    ///
    /// `None` only when no configured anchor certificate verifies the
    /// top-most certificate on its own.
    #[must_use]
    pub fn trust_anchor(&self) -> Option<&Arc<TrustAnchor>> {
        self.trust_anchor.as_ref()
    }

    /// Public key of the leaf certificate
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}
