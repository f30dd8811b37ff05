//! Structured logging infrastructure
//!
//! Provides env_logger-based logging with secure handling of certificate
//! material. Crates that log through `tracing` with its `log` feature enabled
//! are captured by the same logger.

use log::{info, warn};
use sha2::{Digest, Sha256};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Number of hex characters kept from a SHA-256 fingerprint.
const FINGERPRINT_LEN: usize = 12;

/// Logging infrastructure using `env_logger`
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging system (should be called once at application startup)
    ///
    /// Configure logging levels via `RUST_LOG` environment variable:
    /// - `RUST_LOG=debug` - Enable all debug logs, including every pipeline step
    /// - `RUST_LOG=info` - Enable info and above (recommended for production)
    /// - `RUST_LOG=cryypt_pkix=debug` - Module-specific levels
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_default_env()
                .format_timestamp_micros()
                .init();

            info!("Structured logging initialized");
        });
    }

    /// Initialize logging for test environments
    ///
    /// Use this in test modules to avoid initialization conflicts
    pub fn init_test() {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .try_init();
    }

    /// Short SHA-256 fingerprint of DER-encoded material.
    ///
    /// Returns `#` followed by the first 12 hex characters of the digest, so a
    /// certificate can be traced across log lines without dumping its bytes.
    #[must_use]
    pub fn fingerprint(der: &[u8]) -> String {
        let digest = Sha256::digest(der);
        let hex_hash = hex::encode(digest);
        format!("#{}", &hex_hash[..FINGERPRINT_LEN])
    }

    /// Log a rejected certificate by position and fingerprint
    ///
    /// Only the fingerprint of the DER is written, never the certificate bytes.
    pub fn log_certificate_rejected(
        stage: &str,
        index: usize,
        der: &[u8],
        reason: &dyn std::fmt::Display,
    ) {
        warn!("{}", rejection_message(stage, index, der, reason));
    }
}

fn rejection_message(stage: &str, index: usize, der: &[u8], reason: &dyn std::fmt::Display) -> String {
    format!(
        "Certificate {} {} rejected during {}: {}",
        index,
        LoggingTransformer::fingerprint(der),
        stage,
        reason
    )
}
