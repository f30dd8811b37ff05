//! Shared rcgen-based PKI fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicU16, Ordering};

use cryypt_pkix::{CertPath, Certificate, TrustAnchor, X509Crl};
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, CertificateRevocationListParams,
    DistinguishedName, DnType, IsCa, Issuer, KeyIdMethod, KeyPair, RevocationReason,
    RevokedCertParams, SerialNumber,
};

static SERIAL: AtomicU16 = AtomicU16::new(0x100);

fn next_serial() -> SerialNumber {
    let [hi, lo] = SERIAL.fetch_add(1, Ordering::Relaxed).to_be_bytes();
    SerialNumber::from_slice(&[0x02, hi, lo])
}

fn dn(cn: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    dn.push(DnType::OrganizationName, "Cyrup Test PKI");
    dn
}

fn ca_params(cn: &str) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::default()).expect("ca params");
    params.distinguished_name = dn(cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.serial_number = Some(next_serial());
    params
}

/// CA certificate with the key material needed to issue more
pub struct TestCa {
    pub cert: Certificate,
    name: String,
    key_pem: String,
    issuer: Issuer<'static, KeyPair>,
}

impl TestCa {
    /// Self-signed root CA
    pub fn root(cn: &str) -> Self {
        let key = KeyPair::generate().expect("root key");
        let params = ca_params(cn);
        let cert = params.self_signed(&key).expect("self-signed root");
        Self {
            cert: Certificate::from_der(cert.der().to_vec()).expect("parse root"),
            name: cn.to_string(),
            key_pem: key.serialize_pem(),
            issuer: Issuer::new(params, key),
        }
    }

    /// Intermediate CA issued by this CA
    pub fn intermediate(&self, cn: &str) -> Self {
        let key = KeyPair::generate().expect("intermediate key");
        let params = ca_params(cn);
        let cert = params.signed_by(&key, &self.issuer).expect("sign intermediate");
        Self {
            cert: Certificate::from_der(cert.der().to_vec()).expect("parse intermediate"),
            name: cn.to_string(),
            key_pem: key.serialize_pem(),
            issuer: Issuer::new(params, key),
        }
    }

    /// Re-issued copy of this CA: same name and key, new serial, signed by itself
    pub fn reissued(&self) -> Certificate {
        let key = KeyPair::from_pem(&self.key_pem).expect("reload key");
        let params = ca_params(&self.name);
        let cert = params.signed_by(&key, &self.issuer).expect("sign reissue");
        Certificate::from_der(cert.der().to_vec()).expect("parse reissue")
    }

    /// End-entity certificate valid for the default rcgen window
    pub fn leaf(&self, dns: &str) -> Certificate {
        let mut params = CertificateParams::new(vec![dns.to_string()]).expect("leaf params");
        params.distinguished_name = dn(dns);
        params.serial_number = Some(next_serial());
        self.sign_leaf(params)
    }

    /// End-entity certificate that expired in 2001
    pub fn expired_leaf(&self, dns: &str) -> Certificate {
        let mut params = CertificateParams::new(vec![dns.to_string()]).expect("leaf params");
        params.distinguished_name = dn(dns);
        params.serial_number = Some(next_serial());
        params.not_before = date_time_ymd(2000, 1, 1);
        params.not_after = date_time_ymd(2001, 1, 1);
        self.sign_leaf(params)
    }

    fn sign_leaf(&self, params: CertificateParams) -> Certificate {
        let key = KeyPair::generate().expect("leaf key");
        let cert = params.signed_by(&key, &self.issuer).expect("sign leaf");
        Certificate::from_der(cert.der().to_vec()).expect("parse leaf")
    }

    /// CRL issued by this CA revoking `revoked`
    pub fn crl(&self, revoked: &[&Certificate]) -> X509Crl {
        let params = CertificateRevocationListParams {
            this_update: date_time_ymd(2020, 1, 1),
            next_update: date_time_ymd(2090, 1, 1),
            crl_number: SerialNumber::from_slice(&[0x07]),
            issuing_distribution_point: None,
            revoked_certs: revoked
                .iter()
                .map(|cert| RevokedCertParams {
                    serial_number: SerialNumber::from_slice(cert.serial_number()),
                    revocation_time: date_time_ymd(2021, 6, 1),
                    reason_code: Some(RevocationReason::KeyCompromise),
                    invalidity_date: None,
                })
                .collect(),
            key_identifier_method: KeyIdMethod::Sha256,
        };
        let crl = params.signed_by(&self.issuer).expect("sign crl");
        X509Crl::from_der(crl.der().to_vec()).expect("parse crl")
    }

    pub fn anchor(&self) -> TrustAnchor {
        TrustAnchor::from_certificate(self.cert.clone())
    }
}

/// Root, one intermediate and a leaf
pub struct ThreeTier {
    pub root: TestCa,
    pub intermediate: TestCa,
    pub leaf: Certificate,
}

impl ThreeTier {
    pub fn new() -> Self {
        let root = TestCa::root("Integration Root CA");
        let intermediate = root.intermediate("Integration Intermediate CA");
        let leaf = intermediate.leaf("service.integration.example");
        Self {
            root,
            intermediate,
            leaf,
        }
    }

    pub fn path(&self) -> CertPath {
        CertPath::new(vec![self.leaf.clone(), self.intermediate.cert.clone()])
    }
}
