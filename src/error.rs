//! Error types for test generation.
//!
//! The negotiation model itself never fails: an empty or disjoint pair of
//! key exchange modes resolves to "no agreement", which is an assertable
//! test outcome. Errors only come from the edges: parsing names given on the
//! command line or in config, building PSK commands without an identity,
//! and I/O.

use thiserror::Error;

/// Test generator errors.
#[derive(Error, Debug)]
pub enum CompatError {
    /// Cipher suite name not in the registry.
    #[error("Unknown cipher suite: {0}")]
    UnknownCipherSuite(String),

    /// Signature algorithm name not in the registry.
    #[error("Unknown signature algorithm: {0}")]
    UnknownSignatureAlgorithm(String),

    /// Named group not in the registry.
    #[error("Unknown named group: {0}")]
    UnknownNamedGroup(String),

    /// Key exchange mode name not recognised.
    #[error("Unknown key exchange mode: {0}")]
    UnknownKexMode(String),

    /// TLS implementation name not recognised.
    #[error("Unknown TLS implementation: {0}")]
    UnknownImplementation(String),

    /// Test suite name not recognised.
    #[error("Unknown test suite: {0}")]
    UnknownTestSuite(String),

    /// A PSK command was requested but no identity is configured.
    #[error("No PSK identity configured for {0}")]
    MissingPskIdentity(String),

    /// PSK key is empty or not valid hex.
    #[error("Invalid PSK key: {0}")]
    InvalidPskKey(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, CompatError>;

impl From<toml::de::Error> for CompatError {
    fn from(err: toml::de::Error) -> Self {
        CompatError::Config(err.to_string())
    }
}

impl From<hex::FromHexError> for CompatError {
    fn from(err: hex::FromHexError) -> Self {
        CompatError::InvalidPskKey(err.to_string())
    }
}
