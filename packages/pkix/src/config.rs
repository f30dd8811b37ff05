//! Validator configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What revocation checking does when no CRL from a certificate's issuer is
/// loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCrlPolicy {
    /// Accept the certificate
    #[default]
    Allow,
    /// Reject the certificate
    Reject,
}

/// Configuration of a `PkixCertPathValidator`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Restrict signature verification to the engine's own provider
    pub fips_mode: bool,
    /// Behaviour when revocation is enabled and an issuer has no CRL
    pub missing_crl: MissingCrlPolicy,
    /// Longest accepted path, `None` for no limit
    pub max_chain_length: Option<usize>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            fips_mode: false,
            missing_crl: MissingCrlPolicy::Allow,
            max_chain_length: None,
        }
    }
}

impl ValidatorConfig {
    /// Require a CRL for every certificate when revocation is enabled
    #[must_use]
    pub fn strict() -> Self {
        Self {
            missing_crl: MissingCrlPolicy::Reject,
            ..Self::default()
        }
    }

    /// FIPS deployment: only the engine's provider may verify signatures
    #[must_use]
    pub fn fips() -> Self {
        Self {
            fips_mode: true,
            ..Self::default()
        }
    }

    /// Load configuration from JSON; omitted fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are inconsistent.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values for consistency
    ///
    /// # Errors
    ///
    /// Returns an error if `max_chain_length` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chain_length == Some(0) {
            return Err(ConfigError::Invalid(
                "max_chain_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
