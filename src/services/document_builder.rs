// src/services/document_builder.rs
//! DID and DID Document construction.
//!
//! Turns an address and a network name into a `did:ethr` identifier and the
//! document asserting control of it. Construction is a pure function of its
//! inputs and the registry the builder was created with.

use log::debug;

use crate::error::Result;
use crate::models::did::{Did, DidDocument, VerificationMethod, DID_CONTEXTS, VERIFICATION_METHOD_TYPE};
use crate::models::network::ChainRegistry;
use crate::utils::crypto::{address_from_slice, format_address};

/// Builds `did:ethr` identifiers and documents for the networks in its
/// registry.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    registry: ChainRegistry,
}

impl DocumentBuilder {
    /// Creates a builder over an explicit network registry.
    pub fn new(registry: ChainRegistry) -> Self {
        DocumentBuilder { registry }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Builds the DID and its document.
    ///
    /// # Arguments
    /// * `address` - 20 raw address bytes (an `Address` works as is)
    /// * `network` - Network name, looked up in the registry
    ///
    /// # Returns
    /// `did:ethr:<network>:<0x lowercase address>` and a document with one
    /// `EcdsaSecp256k1RecoveryMethod2020` verification method, referenced from
    /// both `authentication` and `assertionMethod`.
    ///
    /// # Errors
    /// - `InvalidAddress` if `address` is not exactly 20 bytes
    /// - `UnknownNetwork` if the registry has no chain id for `network`
    pub fn build(&self, address: impl AsRef<[u8]>, network: &str) -> Result<(Did, DidDocument)> {
        let address = address_from_slice(address.as_ref())?;
        let chain_id = self.registry.chain_id(network)?;

        let did = Did::new(network, address);
        let did_string = did.to_string();
        let method_id = did.controller_url();

        let verification_method = VerificationMethod {
            id: method_id.clone(),
            kind: VERIFICATION_METHOD_TYPE.to_string(),
            controller: did_string.clone(),
            blockchain_account_id: format!("eip155:{}:{}", chain_id, format_address(&address)),
        };

        let document = DidDocument {
            context: DID_CONTEXTS.iter().map(|uri| uri.to_string()).collect(),
            id: did_string,
            verification_method: vec![verification_method],
            authentication: vec![method_id.clone()],
            assertion_method: vec![method_id],
        };

        debug!("built document for {} (chain {})", did, chain_id);
        Ok((did, document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DidError;
    use crate::models::network::NetworkConfig;
    use crate::utils::crypto::parse_address;
    use crate::utils::serialization::canonical_serialize;

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(ChainRegistry::well_known())
    }

    #[test]
    fn test_optimism_scenario() {
        let (did, document) = builder().build(parse_address(ADDRESS).unwrap(), "optimism").unwrap();

        assert_eq!(did.to_string(), format!("did:ethr:optimism:{}", ADDRESS));
        assert_eq!(document.id, did.to_string());

        let method = &document.verification_method[0];
        assert_eq!(method.id, format!("did:ethr:optimism:{}#controller", ADDRESS));
        assert_eq!(method.controller, document.id);
        assert_eq!(method.kind, "EcdsaSecp256k1RecoveryMethod2020");
        assert_eq!(method.blockchain_account_id, format!("eip155:10:{}", ADDRESS));
        assert_eq!(document.authentication, vec![method.id.clone()]);
        assert_eq!(document.assertion_method, vec![method.id.clone()]);
        assert_eq!(document.context, DID_CONTEXTS.to_vec());
    }

    #[test]
    fn test_build_is_deterministic() {
        let address = parse_address("0xAbCdEf0123456789aBcDeF0123456789AbCdEf01").unwrap();
        let (_, first) = builder().build(address, "mainnet").unwrap();
        let (_, second) = builder().build(address, "mainnet").unwrap();
        assert_eq!(
            canonical_serialize(&first).unwrap(),
            canonical_serialize(&second).unwrap()
        );
    }

    #[test]
    fn test_address_segment_is_lowercase() {
        let address = parse_address("0xABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
        let (did, document) = builder().build(address, "sepolia").unwrap();
        assert_eq!(
            did.to_string(),
            "did:ethr:sepolia:0xabcdef0123456789abcdef0123456789abcdef01"
        );
        assert!(document.verification_method[0]
            .blockchain_account_id
            .ends_with("0xabcdef0123456789abcdef0123456789abcdef01"));
    }

    #[test]
    fn test_unknown_network_is_rejected() {
        let result = builder().build(parse_address(ADDRESS).unwrap(), "nonexistent-network");
        assert!(matches!(result, Err(DidError::UnknownNetwork(_))));
    }

    #[test]
    fn test_wrong_address_width_is_rejected() {
        assert!(matches!(
            builder().build([0x11u8; 19], "optimism"),
            Err(DidError::InvalidAddress(_))
        ));
        assert!(matches!(
            builder().build(vec![0x11u8; 32], "optimism"),
            Err(DidError::InvalidAddress(_))
        ));
        assert!(builder().build([0x11u8; 20], "optimism").is_ok());
    }

    #[test]
    fn test_registry_is_explicit() {
        let mut registry = ChainRegistry::new();
        registry.insert("devnet", NetworkConfig::new(1337));
        let builder = DocumentBuilder::new(registry);

        let (_, document) = builder.build([0x22u8; 20], "devnet").unwrap();
        assert!(document.verification_method[0]
            .blockchain_account_id
            .starts_with("eip155:1337:"));
        assert!(matches!(
            builder.build([0x22u8; 20], "optimism"),
            Err(DidError::UnknownNetwork(_))
        ));
    }
}
