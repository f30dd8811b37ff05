//! Field extraction from DER using x509-parser

use x509_parser::prelude::*;

use super::{BasicConstraints, CertificateInner, DistinguishedName, KeyUsage, PublicKey};
use crate::error::CertificateError;

/// Parse certificate DER and extract the fields used during validation
pub(crate) fn parse_certificate(der: Vec<u8>) -> Result<CertificateInner, CertificateError> {
    let fields = extract_fields(&der)?;
    Ok(CertificateInner { der, ..fields })
}

fn extract_fields(der: &[u8]) -> Result<CertificateInner, CertificateError> {
    let (rem, cert) = X509Certificate::from_der(der)
        .map_err(|e| CertificateError::Parse(format!("X.509 parsing failed: {e}")))?;
    if !rem.is_empty() {
        return Err(CertificateError::Parse(format!(
            "{} trailing bytes after certificate",
            rem.len()
        )));
    }

    let basic_constraints = match cert.basic_constraints() {
        Ok(Some(ext)) if ext.value.ca => BasicConstraints::Ca {
            path_len: ext.value.path_len_constraint,
        },
        Ok(_) => BasicConstraints::EndEntity,
        Err(e) => {
            return Err(CertificateError::Parse(format!(
                "invalid basic constraints: {e}"
            )))
        }
    };

    let key_usage = match cert.key_usage() {
        Ok(Some(ext)) => Some(KeyUsage {
            key_cert_sign: ext.value.key_cert_sign(),
            crl_sign: ext.value.crl_sign(),
        }),
        Ok(None) => None,
        Err(e) => return Err(CertificateError::Parse(format!("invalid key usage: {e}"))),
    };

    let spki = cert.public_key();
    let public_key = PublicKey::new(spki.algorithm.algorithm.to_id_string(), spki.raw.to_vec());
    let validity = cert.validity();

    Ok(CertificateInner {
        subject: name_of(cert.subject()),
        issuer: name_of(cert.issuer()),
        serial: cert.raw_serial().to_vec(),
        public_key,
        basic_constraints,
        key_usage,
        not_before: validity.not_before.timestamp(),
        not_after: validity.not_after.timestamp(),
        der: Vec::new(),
    })
}

/// Parse a standalone DER `Name`
pub(crate) fn parse_name(der: &[u8]) -> Result<DistinguishedName, CertificateError> {
    let (_, name) = X509Name::from_der(der)
        .map_err(|e| CertificateError::Parse(format!("invalid distinguished name: {e}")))?;
    Ok(name_of(&name))
}

pub(crate) fn name_of(name: &X509Name<'_>) -> DistinguishedName {
    DistinguishedName::new(name.as_raw().to_vec(), name.to_string())
}
