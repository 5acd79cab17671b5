// src/lib.rs

//! # Ethereum DID System
//!
//! Issues `did:ethr` decentralized identifiers bound to secp256k1 key pairs,
//! signs the DID Document asserting control of them, and verifies that
//! binding later from the document and signature alone.
//!
//! ## Architecture Overview
//! 1. **Wallet Layer**: [`KeyPair`] generation and address derivation
//! 2. **Models**: DID, DID Document, signature and bundle types
//! 3. **Services Layer**: [`DocumentBuilder`], the signature engine, the
//!    [`IdentityIssuer`] pipeline and the verifier
//! 4. **Utilities**: canonical serialization and Keccak helpers
//! 5. **Blockchain Layer**: optional RPC probe, never used by sign/verify
//!
//! ## Example
//! ```no_run
//! use ethr_did_system::{ChainRegistry, IdentityIssuer, verifier};
//!
//! let issuer = IdentityIssuer::new(ChainRegistry::well_known());
//! let issued = issuer.issue("optimism")?;
//! assert!(verifier::verify(&issued.bundle).verified);
//! # Ok::<(), ethr_did_system::DidError>(())
//! ```

pub mod blockchain;
pub mod error;
pub mod models;
pub mod services;
pub mod settings;
pub mod utils;
pub mod wallet;

pub use error::{DidError, Result};
pub use models::did::{Did, DidDocument, VerificationMethod};
pub use models::identity::{IdentityBundle, IssuedIdentity, SecretMaterial, UnsignedIdentity};
pub use models::network::{ChainRegistry, NetworkConfig};
pub use ethers_core::types::Address;
pub use models::signature::Signature;
pub use services::document_builder::DocumentBuilder;
pub use services::identity_issuer::IdentityIssuer;
pub use services::verifier::{self, VerificationReport};
pub use services::signature_engine;
pub use settings::Settings;
pub use wallet::key_management::KeyPair;
