//! Built-in certificate manager engine
//!
//! Keeps trusted CA roots and CRLs per context and verifies certificates one
//! at a time against them, checking signatures with x509-parser (ring backend).
//! Validity is always evaluated at the current time.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use x509_parser::prelude::*;

use super::{RevocationOptions, VerificationContext, VerificationEngine};
use crate::certificate::unix_seconds;
use crate::config::MissingCrlPolicy;
use crate::error::EngineError;

/// Provider name reported by the built-in engine
pub const PROVIDER_NAME: &str = "cryypt";

/// Built-in engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertManagerConfig {
    /// Whether contexts accept CRLs
    pub crl_supported: bool,
    /// Maximum number of live contexts, `None` for unlimited
    pub max_contexts: Option<usize>,
}

impl Default for CertManagerConfig {
    fn default() -> Self {
        Self {
            crl_supported: true,
            max_contexts: None,
        }
    }
}

/// Engine handing out `CertManager` contexts
#[derive(Debug, Default)]
pub struct CertManagerEngine {
    config: CertManagerConfig,
    live: Arc<AtomicUsize>,
}

impl CertManagerEngine {
    /// Engine with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with explicit configuration
    #[must_use]
    pub fn with_config(config: CertManagerConfig) -> Self {
        Self {
            config,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &CertManagerConfig {
        &self.config
    }

    /// Number of contexts not yet released
    #[must_use]
    pub fn live_contexts(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl VerificationEngine for CertManagerEngine {
    type Context = CertManager;

    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn crl_supported(&self) -> bool {
        self.config.crl_supported
    }

    fn create_context(&self) -> Result<CertManager, EngineError> {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(max) = self.config.max_contexts {
            if live > max {
                self.live.fetch_sub(1, Ordering::SeqCst);
                return Err(EngineError::ResourceUnavailable(format!(
                    "context limit of {max} reached"
                )));
            }
        }

        Ok(CertManager {
            roots: Vec::new(),
            crls: Vec::new(),
            revocation: None,
            crl_supported: self.config.crl_supported,
            _slot: ContextSlot {
                live: Arc::clone(&self.live),
            },
        })
    }
}

struct ContextSlot {
    live: Arc<AtomicUsize>,
}

impl Drop for ContextSlot {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

struct TrustedRoot {
    der: Vec<u8>,
    subject: Vec<u8>,
}

struct LoadedCrl {
    issuer: Vec<u8>,
    issuer_display: String,
    next_update: Option<i64>,
    revoked: HashSet<Vec<u8>>,
}

/// Verification context of the built-in engine
pub struct CertManager {
    roots: Vec<TrustedRoot>,
    crls: Vec<LoadedCrl>,
    revocation: Option<RevocationOptions>,
    crl_supported: bool,
    _slot: ContextSlot,
}

impl CertManager {
    /// Number of trusted roots
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Number of loaded CRLs
    #[must_use]
    pub fn crl_count(&self) -> usize {
        self.crls.len()
    }

    /// Whether `cert` was signed by `root` and the root may sign certificates
    fn signed_by(cert: &X509Certificate<'_>, root: &TrustedRoot) -> bool {
        let Ok((_, root_cert)) = X509Certificate::from_der(&root.der) else {
            return false;
        };
        if let Ok(Some(ku)) = root_cert.key_usage() {
            if !ku.value.key_cert_sign() {
                return false;
            }
        }
        cert.verify_signature(Some(root_cert.public_key())).is_ok()
    }

    fn check_revocation(
        &self,
        cert: &X509Certificate<'_>,
        options: RevocationOptions,
        now: i64,
    ) -> Result<(), EngineError> {
        let issuer = cert.issuer().as_raw();
        let mut found = false;

        for crl in self.crls.iter().filter(|crl| crl.issuer == issuer) {
            found = true;
            if crl.revoked.contains(cert.raw_serial()) {
                return Err(EngineError::Revoked {
                    serial: hex::encode(cert.raw_serial()),
                });
            }
            if crl.next_update.is_some_and(|next| now > next) {
                return Err(EngineError::CrlExpired {
                    issuer: crl.issuer_display.clone(),
                });
            }
        }

        match (found, options.missing_crl) {
            (true, _) | (false, MissingCrlPolicy::Allow) => Ok(()),
            (false, MissingCrlPolicy::Reject) => Err(EngineError::CrlMissing {
                issuer: cert.issuer().to_string(),
            }),
        }
    }
}

impl VerificationContext for CertManager {
    fn load_trusted_root(&mut self, der: &[u8]) -> Result<(), EngineError> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| EngineError::MalformedCertificate(e.to_string()))?;
        match cert.basic_constraints() {
            Ok(Some(bc)) if bc.value.ca => {}
            _ => return Err(EngineError::NotCa),
        }

        if self.roots.iter().any(|root| root.der == der) {
            debug!("Root {} already trusted", cert.subject());
            return Ok(());
        }

        debug!("Trusting root {}", cert.subject());
        self.roots.push(TrustedRoot {
            der: der.to_vec(),
            subject: cert.subject().as_raw().to_vec(),
        });
        Ok(())
    }

    fn unload_trusted_roots(&mut self) -> Result<(), EngineError> {
        self.roots.clear();
        Ok(())
    }

    fn enable_revocation(&mut self, options: RevocationOptions) -> Result<(), EngineError> {
        if !self.crl_supported {
            return Err(EngineError::CrlUnsupported);
        }
        self.revocation = Some(options);
        Ok(())
    }

    fn load_crl(&mut self, der: &[u8]) -> Result<(), EngineError> {
        if !self.crl_supported {
            return Err(EngineError::CrlUnsupported);
        }

        let (_, crl) = CertificateRevocationList::from_der(der)
            .map_err(|e| EngineError::MalformedCrl(e.to_string()))?;
        let issuer = crl.issuer().as_raw();

        let signer = self.roots.iter().filter(|root| root.subject == issuer).find(|root| {
            let Ok((_, root_cert)) = X509Certificate::from_der(&root.der) else {
                return false;
            };
            if let Ok(Some(ku)) = root_cert.key_usage() {
                if !ku.value.crl_sign() {
                    return false;
                }
            }
            crl.verify_signature(root_cert.public_key()).is_ok()
        });
        if signer.is_none() {
            warn!("Rejecting CRL from {}: no trusted signer", crl.issuer());
            return Err(EngineError::CrlSignerNotFound {
                issuer: crl.issuer().to_string(),
            });
        }

        let revoked: HashSet<Vec<u8>> = crl
            .iter_revoked_certificates()
            .map(|entry| entry.raw_serial().to_vec())
            .collect();
        debug!(
            "Loaded CRL from {} with {} revoked entries",
            crl.issuer(),
            revoked.len()
        );
        self.crls.push(LoadedCrl {
            issuer: issuer.to_vec(),
            issuer_display: crl.issuer().to_string(),
            next_update: crl.next_update().map(|t| t.timestamp()),
            revoked,
        });
        Ok(())
    }

    fn verify(&mut self, der: &[u8]) -> Result<(), EngineError> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| EngineError::MalformedCertificate(e.to_string()))?;

        let now = unix_seconds(SystemTime::now());
        let validity = cert.validity();
        if now < validity.not_before.timestamp() {
            return Err(EngineError::NotYetValid);
        }
        if now > validity.not_after.timestamp() {
            return Err(EngineError::Expired);
        }

        let issuer = cert.issuer().as_raw();
        let trusted = self
            .roots
            .iter()
            .filter(|root| root.subject == issuer)
            .any(|root| Self::signed_by(&cert, root));
        if !trusted {
            return Err(EngineError::NoTrustPath {
                issuer: cert.issuer().to_string(),
            });
        }

        match self.revocation {
            Some(options) => self.check_revocation(&cert, options, now),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CaFixture, Fixture};

    #[test]
    fn test_context_limit_and_release() {
        let engine = CertManagerEngine::with_config(CertManagerConfig {
            max_contexts: Some(1),
            ..CertManagerConfig::default()
        });

        let first = engine.create_context();
        assert!(first.is_ok());
        assert_eq!(engine.live_contexts(), 1);
        assert!(matches!(
            engine.create_context(),
            Err(EngineError::ResourceUnavailable(_))
        ));

        drop(first);
        assert_eq!(engine.live_contexts(), 0);
        assert!(engine.create_context().is_ok());
        assert_eq!(engine.live_contexts(), 0);
    }

    #[test]
    fn test_non_ca_root_rejected() {
        let root = CaFixture::root("Manager Root");
        let leaf = root.issue_leaf("leaf.example");
        let mut manager = CertManagerEngine::new().create_context().unwrap();

        assert_eq!(manager.load_trusted_root(&leaf.der), Err(EngineError::NotCa));
        assert!(manager.load_trusted_root(&root.der).is_ok());
        assert!(manager.load_trusted_root(&root.der).is_ok());
        assert_eq!(manager.root_count(), 1);
    }

    #[test]
    fn test_verify_requires_trusted_signer() {
        let root = CaFixture::root("Manager Root");
        let other = CaFixture::root("Other Root");
        let leaf = root.issue_leaf("leaf.example");
        let mut manager = CertManagerEngine::new().create_context().unwrap();

        manager.load_trusted_root(&other.der).unwrap();
        assert!(matches!(
            manager.verify(&leaf.der),
            Err(EngineError::NoTrustPath { .. })
        ));

        manager.load_trusted_root(&root.der).unwrap();
        assert_eq!(manager.verify(&leaf.der), Ok(()));

        manager.unload_trusted_roots().unwrap();
        assert_eq!(manager.root_count(), 0);
        assert!(manager.verify(&leaf.der).is_err());
    }

    #[test]
    fn test_same_name_different_key_is_not_trusted() {
        let root = CaFixture::root("Shared Name");
        let impostor = CaFixture::root("Shared Name");
        let leaf = impostor.issue_leaf("leaf.example");
        let mut manager = CertManagerEngine::new().create_context().unwrap();

        manager.load_trusted_root(&root.der).unwrap();
        assert!(matches!(
            manager.verify(&leaf.der),
            Err(EngineError::NoTrustPath { .. })
        ));
    }

    #[test]
    fn test_expired_certificate() {
        let root = CaFixture::root("Manager Root");
        let leaf = root.issue_expired_leaf("old.example");
        let mut manager = CertManagerEngine::new().create_context().unwrap();

        manager.load_trusted_root(&root.der).unwrap();
        assert_eq!(manager.verify(&leaf.der), Err(EngineError::Expired));
    }

    #[test]
    fn test_crl_requires_loaded_issuer() {
        let root = CaFixture::root("Manager Root");
        let crl = root.crl(&[]);
        let mut manager = CertManagerEngine::new().create_context().unwrap();

        assert!(matches!(
            manager.load_crl(&crl),
            Err(EngineError::CrlSignerNotFound { .. })
        ));
        manager.load_trusted_root(&root.der).unwrap();
        assert_eq!(manager.load_crl(&crl), Ok(()));
        assert_eq!(manager.crl_count(), 1);
    }

    #[test]
    fn test_revoked_and_missing_crl_policy() {
        let root = CaFixture::root("Manager Root");
        let good = root.issue_leaf("good.example");
        let bad = root.issue_leaf("bad.example");
        let crl = root.crl(&[&bad]);

        let mut manager = CertManagerEngine::new().create_context().unwrap();
        manager.load_trusted_root(&root.der).unwrap();
        manager
            .enable_revocation(RevocationOptions {
                missing_crl: MissingCrlPolicy::Reject,
            })
            .unwrap();

        assert!(matches!(
            manager.verify(&good.der),
            Err(EngineError::CrlMissing { .. })
        ));

        manager.load_crl(&crl).unwrap();
        assert_eq!(manager.verify(&good.der), Ok(()));
        assert!(matches!(
            manager.verify(&bad.der),
            Err(EngineError::Revoked { .. })
        ));
    }

    #[test]
    fn test_crl_disabled_engine() {
        let root = CaFixture::root("Manager Root");
        let engine = CertManagerEngine::with_config(CertManagerConfig {
            crl_supported: false,
            ..CertManagerConfig::default()
        });
        let mut manager = engine.create_context().unwrap();
        manager.load_trusted_root(&root.der).unwrap();

        assert!(!engine.crl_supported());
        assert_eq!(
            manager.enable_revocation(RevocationOptions::default()),
            Err(EngineError::CrlUnsupported)
        );
        assert_eq!(manager.load_crl(&root.crl(&[])), Err(EngineError::CrlUnsupported));
    }

    #[test]
    fn test_fixture_chain_verifies_top_down() {
        let fixture = Fixture::three_tier();
        let mut manager = CertManagerEngine::new().create_context().unwrap();
        manager.load_trusted_root(&fixture.root.der).unwrap();

        for cert in fixture.chain.iter().rev() {
            assert_eq!(manager.verify(cert.der()), Ok(()));
            if cert.basic_constraints().is_ca() {
                manager.load_trusted_root(cert.der()).unwrap();
            }
        }
    }
}
