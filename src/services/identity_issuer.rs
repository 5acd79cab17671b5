// src/services/identity_issuer.rs
//! Identity Issuer Service
//!
//! Runs the issuance pipeline for a `did:ethr` identity:
//! key generation, document construction, canonical serialization and
//! signing. The result is an [`IssuedIdentity`] whose public bundle and secret
//! key are separate values.

use log::info;
use rand::{CryptoRng, RngCore};

use crate::error::Result;
use crate::models::identity::{IssuedIdentity, UnsignedIdentity};
use crate::models::network::ChainRegistry;
use crate::services::document_builder::DocumentBuilder;
use crate::wallet::key_management::KeyPair;

/// Service issuing signed `did:ethr` identities.
///
/// Holds no mutable state, so one issuer can be shared across threads and
/// used for any number of independent identities.
#[derive(Debug, Clone)]
pub struct IdentityIssuer {
    /// Builder carrying the network registry
    builder: DocumentBuilder,
}

impl IdentityIssuer {
    /// Creates a new IdentityIssuer over an explicit network registry.
    pub fn new(registry: ChainRegistry) -> Self {
        Self {
            builder: DocumentBuilder::new(registry),
        }
    }

    pub fn builder(&self) -> &DocumentBuilder {
        &self.builder
    }

    /// Issues a brand new identity on `network`, with a key drawn from the
    /// operating system's entropy source.
    ///
    /// # Errors
    /// `Entropy`, `UnknownNetwork`, `Serialization` or `Signing`, whichever
    /// step fails first. Nothing is retried.
    pub fn issue(&self, network: &str) -> Result<IssuedIdentity> {
        self.issue_with_key(KeyPair::generate()?, network)
    }

    /// Same as [`IdentityIssuer::issue`], with a caller-supplied RNG.
    pub fn issue_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        network: &str,
    ) -> Result<IssuedIdentity> {
        self.issue_with_key(KeyPair::generate_with(rng)?, network)
    }

    /// Issues an identity for an existing key pair.
    ///
    /// # Arguments
    /// * `key_pair` - Key the identity is bound to; handed back as the secret
    /// * `network` - Network name from the registry
    pub fn issue_with_key(&self, key_pair: KeyPair, network: &str) -> Result<IssuedIdentity> {
        let unsigned = self.prepare(&key_pair, network)?;
        let bundle = unsigned.sign(&key_pair)?;
        info!("issued {}", bundle.did());
        Ok(IssuedIdentity {
            bundle,
            secret: key_pair.into_secret(),
        })
    }

    /// Builds the unsigned identity for `key_pair` without signing it.
    pub fn prepare(&self, key_pair: &KeyPair, network: &str) -> Result<UnsignedIdentity> {
        let (did, document) = self.builder.build(key_pair.address(), network)?;
        Ok(UnsignedIdentity::new(did, document))
    }
}
