//! Test fixtures: rcgen certificate hierarchies and a recording engine

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, CertificateRevocationListParams, DnType,
    IsCa, Issuer, KeyIdMethod, KeyPair, RevocationReason, RevokedCertParams, SerialNumber,
};

use crate::anchor::TrustAnchor;
use crate::certificate::{CertPath, Certificate};
use crate::engine::{RevocationOptions, VerificationContext, VerificationEngine};
use crate::error::EngineError;

static SERIAL: AtomicU16 = AtomicU16::new(1);

fn next_serial() -> SerialNumber {
    let [hi, lo] = SERIAL.fetch_add(1, Ordering::Relaxed).to_be_bytes();
    SerialNumber::from_slice(&[0x01, hi, lo])
}

fn common_name(cn: &str) -> rcgen::DistinguishedName {
    let mut dn = rcgen::DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    dn
}

fn ca_params(cn: &str) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::default()).unwrap();
    params.distinguished_name = common_name(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.serial_number = Some(next_serial());
    params
}

/// End-entity certificate
pub(crate) struct Leaf {
    pub(crate) der: Vec<u8>,
    pub(crate) cert: Certificate,
}

/// CA certificate together with its signing key
pub(crate) struct CaFixture {
    pub(crate) der: Vec<u8>,
    pub(crate) cert: Certificate,
    issuer: Issuer<'static, KeyPair>,
}

impl CaFixture {
    pub(crate) fn root(cn: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let params = ca_params(cn);
        let cert = params.self_signed(&key).unwrap();
        let der = cert.der().to_vec();
        Self {
            cert: Certificate::from_der(der.clone()).unwrap(),
            der,
            issuer: Issuer::new(params, key),
        }
    }

    pub(crate) fn issue_ca(&self, cn: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let params = ca_params(cn);
        let cert = params.signed_by(&key, &self.issuer).unwrap();
        let der = cert.der().to_vec();
        Self {
            cert: Certificate::from_der(der.clone()).unwrap(),
            der,
            issuer: Issuer::new(params, key),
        }
    }

    fn issue(&self, params: CertificateParams) -> Leaf {
        let key = KeyPair::generate().unwrap();
        let cert = params.signed_by(&key, &self.issuer).unwrap();
        let der = cert.der().to_vec();
        Leaf {
            cert: Certificate::from_der(der.clone()).unwrap(),
            der,
        }
    }

    pub(crate) fn issue_leaf(&self, dns: &str) -> Leaf {
        let mut params = CertificateParams::new(vec![dns.to_string()]).unwrap();
        params.distinguished_name = common_name(dns);
        params.serial_number = Some(next_serial());
        self.issue(params)
    }

    pub(crate) fn issue_expired_leaf(&self, dns: &str) -> Leaf {
        let mut params = CertificateParams::new(vec![dns.to_string()]).unwrap();
        params.distinguished_name = common_name(dns);
        params.serial_number = Some(next_serial());
        params.not_before = date_time_ymd(2000, 1, 1);
        params.not_after = date_time_ymd(2001, 1, 1);
        self.issue(params)
    }

    pub(crate) fn anchor(&self) -> TrustAnchor {
        TrustAnchor::from_certificate(self.cert.clone())
    }

    /// CRL signed by this CA listing the given leaves
    pub(crate) fn crl(&self, revoked: &[&Leaf]) -> Vec<u8> {
        let params = CertificateRevocationListParams {
            this_update: date_time_ymd(2020, 1, 1),
            next_update: date_time_ymd(2090, 1, 1),
            crl_number: SerialNumber::from_slice(&[0x01]),
            issuing_distribution_point: None,
            revoked_certs: revoked
                .iter()
                .map(|leaf| RevokedCertParams {
                    serial_number: SerialNumber::from_slice(leaf.cert.serial_number()),
                    revocation_time: date_time_ymd(2021, 1, 1),
                    reason_code: Some(RevocationReason::KeyCompromise),
                    invalidity_date: None,
                })
                .collect(),
            key_identifier_method: KeyIdMethod::Sha256,
        };
        params.signed_by(&self.issuer).unwrap().der().to_vec()
    }
}

/// Root anchor, a run of intermediates and a leaf
pub(crate) struct Fixture {
    pub(crate) root: CaFixture,
    pub(crate) intermediates: Vec<CaFixture>,
    pub(crate) leaf: Leaf,
    /// Leaf first, top-most intermediate last
    pub(crate) chain: Vec<Certificate>,
}

impl Fixture {
    pub(crate) fn with_intermediates(count: usize) -> Self {
        let root = CaFixture::root("Fixture Root CA");
        let mut intermediates: Vec<CaFixture> = Vec::with_capacity(count);
        for level in 0..count {
            let issuer = intermediates.last().unwrap_or(&root);
            let ca = issuer.issue_ca(&format!("Fixture Intermediate CA {level}"));
            intermediates.push(ca);
        }
        let leaf = intermediates
            .last()
            .unwrap_or(&root)
            .issue_leaf("leaf.fixture.example");

        let mut chain = vec![leaf.cert.clone()];
        chain.extend(intermediates.iter().rev().map(|ca| ca.cert.clone()));
        Self {
            root,
            intermediates,
            leaf,
            chain,
        }
    }

    pub(crate) fn three_tier() -> Self {
        Self::with_intermediates(1)
    }

    pub(crate) fn path(&self) -> CertPath {
        CertPath::new(self.chain.clone())
    }
}

/// Engine operation observed by `RecordingEngine`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create,
    LoadRoot(Vec<u8>),
    UnloadRoots,
    EnableRevocation,
    LoadCrl(Vec<u8>),
    Verify(Vec<u8>),
    Release,
}

/// Scripted engine behaviour
#[derive(Debug, Clone)]
pub(crate) struct Script {
    /// 1-based `create_context` attempt that fails
    pub(crate) fail_create_at: Option<usize>,
    pub(crate) fail_unload: bool,
    pub(crate) crl_supported: bool,
    pub(crate) reject_roots: Vec<Vec<u8>>,
    pub(crate) reject_verify: Vec<Vec<u8>>,
    pub(crate) reject_crls: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            fail_create_at: None,
            fail_unload: false,
            crl_supported: true,
            reject_roots: Vec::new(),
            reject_verify: Vec::new(),
            reject_crls: false,
        }
    }
}

/// Engine that accepts everything unless scripted otherwise and records calls
pub(crate) struct RecordingEngine {
    script: Script,
    calls: Arc<Mutex<Vec<Call>>>,
    creates: AtomicUsize,
}

impl RecordingEngine {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
            creates: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn verified(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Verify(der) => Some(der),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }
}

impl VerificationEngine for RecordingEngine {
    type Context = RecordingContext;

    fn provider_name(&self) -> &str {
        "recording"
    }

    fn crl_supported(&self) -> bool {
        self.script.crl_supported
    }

    fn create_context(&self) -> Result<RecordingContext, EngineError> {
        let attempt = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if self.script.fail_create_at == Some(attempt) {
            return Err(EngineError::ResourceUnavailable("scripted".to_string()));
        }
        self.calls.lock().unwrap().push(Call::Create);
        Ok(RecordingContext {
            script: self.script.clone(),
            calls: Arc::clone(&self.calls),
        })
    }
}

pub(crate) struct RecordingContext {
    script: Script,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingContext {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl VerificationContext for RecordingContext {
    fn load_trusted_root(&mut self, der: &[u8]) -> Result<(), EngineError> {
        self.record(Call::LoadRoot(der.to_vec()));
        if self.script.reject_roots.iter().any(|root| root == der) {
            return Err(EngineError::NotCa);
        }
        Ok(())
    }

    fn unload_trusted_roots(&mut self) -> Result<(), EngineError> {
        self.record(Call::UnloadRoots);
        if self.script.fail_unload {
            return Err(EngineError::ResourceUnavailable("scripted unload".to_string()));
        }
        Ok(())
    }

    fn enable_revocation(&mut self, _options: RevocationOptions) -> Result<(), EngineError> {
        self.record(Call::EnableRevocation);
        Ok(())
    }

    fn load_crl(&mut self, der: &[u8]) -> Result<(), EngineError> {
        self.record(Call::LoadCrl(der.to_vec()));
        if self.script.reject_crls {
            return Err(EngineError::CrlSignerNotFound {
                issuer: "scripted".to_string(),
            });
        }
        Ok(())
    }

    fn verify(&mut self, der: &[u8]) -> Result<(), EngineError> {
        self.record(Call::Verify(der.to_vec()));
        if self.script.reject_verify.iter().any(|cert| cert == der) {
            return Err(EngineError::NoTrustPath {
                issuer: "scripted".to_string(),
            });
        }
        Ok(())
    }
}

impl Drop for RecordingContext {
    fn drop(&mut self) {
        self.record(Call::Release);
    }
}
