//! Validation parameters

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::anchor::TrustAnchor;
use crate::checker::CertPathChecker;
use crate::selector::X509CertSelector;
use crate::store::CertStore;

/// Parameters accepted by a certificate path validator
///
/// Validators downcast to the concrete kind they understand and reject any
/// other kind as invalid.
pub trait CertPathParameters: Any + Send + Sync {
    /// Upcast for downcasting to the concrete parameter kind
    fn as_any(&self) -> &dyn Any;
}

/// PKIX validation parameters
///
/// Read-only during validation. Revocation checking is enabled by default.
#[derive(Clone)]
pub struct PkixParameters {
    trust_anchors: Vec<Arc<TrustAnchor>>,
    target_constraints: Option<X509CertSelector>,
    cert_stores: Vec<Arc<dyn CertStore>>,
    revocation_enabled: bool,
    explicit_policy_required: bool,
    any_policy_inhibited: bool,
    policy_mapping_inhibited: bool,
    policy_qualifiers_rejected: bool,
    initial_policies: BTreeSet<String>,
    cert_path_checkers: Vec<Arc<dyn CertPathChecker>>,
    date: Option<SystemTime>,
    sig_provider: Option<String>,
}

impl PkixParameters {
    /// Parameters trusting the given anchors
    pub fn new(trust_anchors: impl IntoIterator<Item = TrustAnchor>) -> Self {
        Self {
            trust_anchors: trust_anchors.into_iter().map(Arc::new).collect(),
            target_constraints: None,
            cert_stores: Vec::new(),
            revocation_enabled: true,
            explicit_policy_required: false,
            any_policy_inhibited: false,
            policy_mapping_inhibited: false,
            policy_qualifiers_rejected: true,
            initial_policies: BTreeSet::new(),
            cert_path_checkers: Vec::new(),
            date: None,
            sig_provider: None,
        }
    }

    /// Add a shared trust anchor
    #[must_use]
    pub fn with_trust_anchor(mut self, anchor: Arc<TrustAnchor>) -> Self {
        self.trust_anchors.push(anchor);
        self
    }

    /// Constrain the leaf certificate
    #[must_use]
    pub fn with_target_constraints(mut self, selector: X509CertSelector) -> Self {
        self.target_constraints = Some(selector);
        self
    }

    /// Add a CRL source
    #[must_use]
    pub fn with_cert_store(mut self, store: impl CertStore + 'static) -> Self {
        self.cert_stores.push(Arc::new(store));
        self
    }

    /// Enable or disable CRL-based revocation checking
    #[must_use]
    pub fn with_revocation_enabled(mut self, enabled: bool) -> Self {
        self.revocation_enabled = enabled;
        self
    }

    /// Request an explicit policy (not supported)
    #[must_use]
    pub fn with_explicit_policy_required(mut self, required: bool) -> Self {
        self.explicit_policy_required = required;
        self
    }

    /// Inhibit the any-policy OID (not supported)
    #[must_use]
    pub fn with_any_policy_inhibited(mut self, inhibited: bool) -> Self {
        self.any_policy_inhibited = inhibited;
        self
    }

    /// Inhibit policy mapping (logged only)
    #[must_use]
    pub fn with_policy_mapping_inhibited(mut self, inhibited: bool) -> Self {
        self.policy_mapping_inhibited = inhibited;
        self
    }

    /// Reject policy qualifiers (logged only)
    #[must_use]
    pub fn with_policy_qualifiers_rejected(mut self, rejected: bool) -> Self {
        self.policy_qualifiers_rejected = rejected;
        self
    }

    /// Initial acceptable policy OIDs (must stay empty)
    #[must_use]
    pub fn with_initial_policies<I, S>(mut self, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_policies = policies.into_iter().map(Into::into).collect();
        self
    }

    /// Register a path checker; checkers run in registration order
    #[must_use]
    pub fn with_cert_path_checker(mut self, checker: impl CertPathChecker + 'static) -> Self {
        self.cert_path_checkers.push(Arc::new(checker));
        self
    }

    /// Validate at a fixed time instead of now (not supported)
    #[must_use]
    pub fn with_date(mut self, date: SystemTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Preferred signature provider
    #[must_use]
    pub fn with_sig_provider(mut self, provider: impl Into<String>) -> Self {
        self.sig_provider = Some(provider.into());
        self
    }

    /// Trust anchors
    #[must_use]
    pub fn trust_anchors(&self) -> &[Arc<TrustAnchor>] {
        &self.trust_anchors
    }

    /// Leaf certificate constraints
    #[must_use]
    pub fn target_constraints(&self) -> Option<&X509CertSelector> {
        self.target_constraints.as_ref()
    }

    /// CRL sources
    #[must_use]
    pub fn cert_stores(&self) -> &[Arc<dyn CertStore>] {
        &self.cert_stores
    }

    /// Whether revocation checking is enabled
    #[must_use]
    pub fn is_revocation_enabled(&self) -> bool {
        self.revocation_enabled
    }

    /// Whether an explicit policy is required
    #[must_use]
    pub fn is_explicit_policy_required(&self) -> bool {
        self.explicit_policy_required
    }

    /// Whether the any-policy OID is inhibited
    #[must_use]
    pub fn is_any_policy_inhibited(&self) -> bool {
        self.any_policy_inhibited
    }

    /// Whether policy mapping is inhibited
    #[must_use]
    pub fn is_policy_mapping_inhibited(&self) -> bool {
        self.policy_mapping_inhibited
    }

    /// Whether policy qualifiers are rejected
    #[must_use]
    pub fn is_policy_qualifiers_rejected(&self) -> bool {
        self.policy_qualifiers_rejected
    }

    /// Initial acceptable policy OIDs
    #[must_use]
    pub fn initial_policies(&self) -> &BTreeSet<String> {
        &self.initial_policies
    }

    /// Registered checkers in registration order
    #[must_use]
    pub fn cert_path_checkers(&self) -> &[Arc<dyn CertPathChecker>] {
        &self.cert_path_checkers
    }

    /// Validation time override
    #[must_use]
    pub fn date(&self) -> Option<SystemTime> {
        self.date
    }

    /// Preferred signature provider
    #[must_use]
    pub fn sig_provider(&self) -> Option<&str> {
        self.sig_provider.as_deref()
    }
}

impl CertPathParameters for PkixParameters {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for PkixParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PkixParameters")
            .field("trust_anchors", &self.trust_anchors.len())
            .field("target_constraints", &self.target_constraints)
            .field("cert_stores", &self.cert_stores.len())
            .field("revocation_enabled", &self.revocation_enabled)
            .field("explicit_policy_required", &self.explicit_policy_required)
            .field("any_policy_inhibited", &self.any_policy_inhibited)
            .field("initial_policies", &self.initial_policies)
            .field("cert_path_checkers", &self.cert_path_checkers.len())
            .field("date", &self.date)
            .field("sig_provider", &self.sig_provider)
            .finish()
    }
}
