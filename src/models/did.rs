// src/models/did.rs
//! Decentralized Identifier (DID) data model implementation.
//!
//! Defines the `did:ethr` identifier and the DID Document asserting control of
//! it, following the [DID Core Specification](https://www.w3.org/TR/did-core/)
//! and the `EcdsaSecp256k1RecoveryMethod2020` suite.

use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DidError, Result};
use crate::utils::crypto::{format_address, parse_address};

/// DID method implemented by this crate.
pub const DID_METHOD: &str = "ethr";

/// JSON-LD contexts of every document, in canonical order.
pub const DID_CONTEXTS: [&str; 2] = [
    "https://www.w3.org/ns/did/v1",
    "https://w3id.org/security/suites/secp256k1recovery-2020/v2",
];

/// Signature-suite tag of the single verification method.
pub const VERIFICATION_METHOD_TYPE: &str = "EcdsaSecp256k1RecoveryMethod2020";

/// Fragment naming the controller verification method.
pub const CONTROLLER_FRAGMENT: &str = "controller";

/// A `did:ethr:<network>:<address>` identifier.
///
/// The address segment is always lowercase hex, so two identifiers for the
/// same (network, address) pair are textually equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Did {
    network: String,
    address: Address,
}

impl Did {
    pub fn new(network: impl Into<String>, address: Address) -> Self {
        Did {
            network: network.into(),
            address,
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The DID URL of the controller verification method (`<did>#controller`).
    pub fn controller_url(&self) -> String {
        format!("{}#{}", self, CONTROLLER_FRAGMENT)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "did:{}:{}:{}",
            DID_METHOD,
            self.network,
            format_address(&self.address)
        )
    }
}

impl FromStr for Did {
    type Err = DidError;

    /// Parses `did:ethr:<network>:<address>`. The address may be written in
    /// any hex case.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DidError::InvalidDid(s.to_string());
        let rest = s
            .strip_prefix("did:")
            .and_then(|rest| rest.strip_prefix(DID_METHOD))
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(invalid)?;
        let (network, address) = rest.rsplit_once(':').ok_or_else(invalid)?;
        if network.is_empty() || network.contains(':') {
            return Err(invalid());
        }
        let address = parse_address(address).map_err(|_| invalid())?;
        Ok(Did::new(network, address))
    }
}

/// Verification method proving control of a DID through an Ethereum account.
///
/// Field order is part of the canonical form and must not change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationMethod {
    /// DID URL of this method, `<did>#controller`
    pub id: String,

    /// Always [`VERIFICATION_METHOD_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,

    /// The DID controlling this method (the document's own DID)
    pub controller: String,

    /// CAIP-10 account id, `eip155:<chainId>:<address>`
    #[serde(rename = "blockchainAccountId")]
    pub blockchain_account_id: String,
}

/// A DID Document asserting control of a `did:ethr` identifier.
///
/// # Field order
/// Serde emits struct fields in declaration order, which is exactly the
/// schema order of the canonical form: `@context`, `id`,
/// `verificationMethod`, `authentication`, `assertionMethod`.
///
/// # Invariants
/// - exactly one verification method, whose `id` and `controller` reference
///   the document's `id`
/// - every entry of `authentication` and `assertion_method` names a method in
///   `verification_method`
///
/// These are checked by the canonical serializer, not on construction, so a
/// document read back from JSON can still be inspected when it is malformed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DidDocument {
    /// Ordered JSON-LD contexts
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID string
    pub id: String,

    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,

    pub authentication: Vec<String>,

    #[serde(rename = "assertionMethod")]
    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// Looks up a verification method by its DID URL.
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }
}
