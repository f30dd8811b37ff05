//! Common infrastructure shared by the cryypt crates
//!
//! This crate provides:
//! - `env_logger` initialisation for binaries and test harnesses
//! - Short SHA-256 fingerprints for logging certificate and key identities
//! - Rejection logging that identifies certificates by fingerprint only

pub mod logging;

pub use logging::LoggingTransformer;
