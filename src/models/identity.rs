// src/models/identity.rs
//! Identity lifecycle values.
//!
//! An identity is either [`UnsignedIdentity`] (document built, nothing signed)
//! or [`IdentityBundle`] (signed). The transition consumes the unsigned value,
//! so a bundle can only exist with a signature over the canonical form of the
//! exact document it carries. There is no re-signing: a changed document means
//! building a new identity.
//!
//! Secret key material lives in [`SecretMaterial`], a separate owned value
//! that is not `Serialize`.

use ethers_core::types::Address;
use ethers_core::utils::{hex, to_checksum};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DidError, Result};
use crate::models::did::{Did, DidDocument};
use crate::models::signature::Signature;
use crate::services::signature_engine;
use crate::utils::crypto::format_address;
use crate::utils::serialization::{canonical_serialize, checksum_address};
use crate::wallet::key_management::KeyPair;

/// A built identity that has not been signed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedIdentity {
    did: Did,
    document: DidDocument,
}

impl UnsignedIdentity {
    pub fn new(did: Did, document: DidDocument) -> Self {
        UnsignedIdentity { did, document }
    }

    pub fn did(&self) -> &Did {
        &self.did
    }

    pub fn document(&self) -> &DidDocument {
        &self.document
    }

    /// Signs the canonical serialization of the document, moving the identity
    /// into the Signed state.
    ///
    /// The signature is computed over the document alone; it never covers
    /// itself.
    ///
    /// # Errors
    /// `Signing` if `key_pair` does not own the DID's address.
    pub fn sign(self, key_pair: &KeyPair) -> Result<IdentityBundle> {
        if key_pair.address() != self.did.address() {
            return Err(DidError::Signing(format!(
                "key for {} cannot sign for {}",
                format_address(&key_pair.address()),
                self.did
            )));
        }
        let message = canonical_serialize(&self.document)?;
        let signature = signature_engine::sign(&message, &key_pair.private_key_bytes())?;
        Ok(IdentityBundle {
            did: self.did.to_string(),
            did_document: self.document,
            address: self.did.address(),
            signature,
        })
    }
}

/// The public, transmittable unit: DID, document, address and signature.
///
/// # JSON form
/// ```json
/// {
///   "did": "did:ethr:optimism:0x…",
///   "did_document": { "@context": [...], ... },
///   "address": "0x<EIP-55 checksummed>",
///   "signature": "0x<130 hex digits>"
/// }
/// ```
/// Unknown fields are ignored when reading, so a bundle exported together with
/// its private key can still be fed to the verifier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityBundle {
    pub(crate) did: String,
    pub(crate) did_document: DidDocument,
    #[serde(with = "checksum_address")]
    pub(crate) address: Address,
    pub(crate) signature: Signature,
}

impl IdentityBundle {
    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn document(&self) -> &DidDocument {
        &self.did_document
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Private key of an issued identity. Owned by the caller after issuance.
pub struct SecretMaterial {
    signing_key: SigningKey,
}

impl SecretMaterial {
    pub(crate) fn new(signing_key: SigningKey) -> Self {
        SecretMaterial { signing_key }
    }

    /// `0x`-prefixed hex of the 32-byte private key. Handle with care.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretMaterial(<redacted>)")
    }
}

/// Result of issuing an identity: the public bundle plus its secret.
#[derive(Debug)]
pub struct IssuedIdentity {
    pub bundle: IdentityBundle,
    pub secret: SecretMaterial,
}

/// Combined bundle-and-key JSON layout, only produced on explicit request.
#[derive(Serialize)]
struct ExportedIdentity<'a> {
    did: &'a str,
    did_document: &'a DidDocument,
    private_key: String,
    address: String,
    signature: &'a Signature,
}

impl IssuedIdentity {
    /// Serializes the bundle together with the private key.
    ///
    /// Only for handing the whole identity to its owner. The public bundle
    /// alone is what should be stored or transmitted.
    pub fn export_with_secret(&self) -> Result<String> {
        let exported = ExportedIdentity {
            did: &self.bundle.did,
            did_document: &self.bundle.did_document,
            private_key: self.secret.private_key_hex(),
            address: to_checksum(&self.bundle.address, None),
            signature: &self.bundle.signature,
        };
        Ok(serde_json::to_string_pretty(&exported)?)
    }
}
