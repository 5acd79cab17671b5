// src/error.rs
//! Error taxonomy for the DID lifecycle.
//!
//! Every failure surfaces as a distinct [`DidError`] variant. None of them are
//! transient, so nothing in the crate retries, and nothing substitutes a
//! default value (such as a zero address) when an operation fails.

use thiserror::Error;

/// Errors raised while issuing or verifying an identity.
#[derive(Error, Debug)]
pub enum DidError {
    /// The random source could not produce key material.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// An address was not exactly 20 bytes, or its hex text was malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A DID string is not of the form `did:ethr:<network>:<address>`.
    #[error("invalid DID `{0}`")]
    InvalidDid(String),

    /// The network has no chain id in the registry handed to the builder.
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    /// The document is malformed and has no canonical form.
    #[error("cannot serialize document: {0}")]
    Serialization(String),

    /// The private key could not be used for signing.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The signature is malformed or no public key could be recovered from it.
    #[error("signature recovery failed: {0}")]
    Recovery(String),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The RPC endpoint could not be reached or answered with an error.
    #[error("chain provider error: {0}")]
    Chain(String),

    /// The RPC endpoint serves a different chain than the one configured.
    #[error("chain id mismatch: configured {expected}, node reports {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl From<serde_json::Error> for DidError {
    fn from(err: serde_json::Error) -> Self {
        DidError::Serialization(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DidError>;
