// src/utils/serialization.rs
//! Serialization utilities for the DID system.
//!
//! Provides:
//! - the canonical byte form of a DID Document, which is the message both the
//!   signer and the verifier compute independently
//! - EIP-55 checksummed address (de)serialization for bundles

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

use crate::error::{DidError, Result};
use crate::models::did::DidDocument;

/// Produces the canonical serialization of a DID Document.
///
/// # Layout
/// - fields in schema order (`@context`, `id`, `verificationMethod`,
///   `authentication`, `assertionMethod`; inside a method `id`, `type`,
///   `controller`, `blockchainAccountId`), taken from the struct declarations
///   and never from construction or insertion order
/// - `", "` between elements and `": "` after keys
/// - non-ASCII characters and DEL escaped as `\uXXXX` (UTF-16 code units)
///
/// Existing `did:ethr` issuers sign documents in exactly this layout, so their
/// signatures verify here unchanged.
///
/// # Errors
/// `Serialization` if the document is malformed (see [`validate_document`]).
pub fn canonical_serialize(document: &DidDocument) -> Result<Vec<u8>> {
    validate_document(document)?;

    let mut out = Vec::with_capacity(512);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    document.serialize(&mut serializer)?;
    Ok(out)
}

/// Checks the structural invariants a document must satisfy to be signed or
/// verified.
pub fn validate_document(document: &DidDocument) -> Result<()> {
    if document.context.is_empty() {
        return Err(malformed("missing @context"));
    }
    if document.id.is_empty() {
        return Err(malformed("missing id"));
    }
    let [method] = document.verification_method.as_slice() else {
        return Err(malformed(format!(
            "expected exactly one verification method, found {}",
            document.verification_method.len()
        )));
    };
    if method.id.is_empty() || method.kind.is_empty() || method.blockchain_account_id.is_empty()
    {
        return Err(malformed("verification method has an empty field"));
    }
    if method.controller != document.id {
        return Err(malformed("verification method controller is not the document id"));
    }
    if method.id.split('#').next() != Some(document.id.as_str()) {
        return Err(malformed("verification method id is not a URL of the document id"));
    }

    let references = document.authentication.iter().chain(&document.assertion_method);
    for reference in references {
        if document.verification_method(reference).is_none() {
            return Err(malformed(format!("dangling reference `{}`", reference)));
        }
    }
    Ok(())
}

fn malformed(reason: impl Into<String>) -> DidError {
    DidError::Serialization(reason.into())
}

/// Compact JSON with `", "` / `": "` separators and ASCII-only output.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(is_printable_ascii) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && is_printable_ascii(ch as u8) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Control characters below 0x20 never reach the fragment writer, so only DEL
/// needs excluding here.
fn is_printable_ascii(byte: u8) -> bool {
    byte < 0x7f
}

/// Serde adapter writing addresses in EIP-55 checksum case and reading them
/// in any case.
pub mod checksum_address {
    use ethers_core::types::Address;
    use ethers_core::utils::to_checksum;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::utils::crypto::parse_address;

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_checksum(address, None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_address(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::did::{VerificationMethod, DID_CONTEXTS, VERIFICATION_METHOD_TYPE};

    const DID: &str = "did:ethr:optimism:0x1111111111111111111111111111111111111111";

    fn sample_document() -> DidDocument {
        let vm_id = format!("{}#controller", DID);
        DidDocument {
            context: DID_CONTEXTS.iter().map(|c| c.to_string()).collect(),
            id: DID.to_string(),
            verification_method: vec![VerificationMethod {
                id: vm_id.clone(),
                kind: VERIFICATION_METHOD_TYPE.to_string(),
                controller: DID.to_string(),
                blockchain_account_id:
                    "eip155:10:0x1111111111111111111111111111111111111111".to_string(),
            }],
            authentication: vec![vm_id.clone()],
            assertion_method: vec![vm_id],
        }
    }

    #[test]
    fn test_canonical_layout() {
        let bytes = canonical_serialize(&sample_document()).unwrap();
        let expected = concat!(
            r#"{"@context": ["https://www.w3.org/ns/did/v1", "https://w3id.org/security/suites/secp256k1recovery-2020/v2"], "#,
            r#""id": "did:ethr:optimism:0x1111111111111111111111111111111111111111", "#,
            r#""verificationMethod": [{"id": "did:ethr:optimism:0x1111111111111111111111111111111111111111#controller", "#,
            r#""type": "EcdsaSecp256k1RecoveryMethod2020", "#,
            r#""controller": "did:ethr:optimism:0x1111111111111111111111111111111111111111", "#,
            r#""blockchainAccountId": "eip155:10:0x1111111111111111111111111111111111111111"}], "#,
            r#""authentication": ["did:ethr:optimism:0x1111111111111111111111111111111111111111#controller"], "#,
            r#""assertionMethod": ["did:ethr:optimism:0x1111111111111111111111111111111111111111#controller"]}"#,
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_independent_of_source_key_order() {
        // Same logical document, keys shuffled in the source JSON.
        let shuffled = format!(
            r#"{{
                "assertionMethod": ["{did}#controller"],
                "verificationMethod": [{{
                    "blockchainAccountId": "eip155:10:0x1111111111111111111111111111111111111111",
                    "controller": "{did}",
                    "type": "EcdsaSecp256k1RecoveryMethod2020",
                    "id": "{did}#controller"
                }}],
                "id": "{did}",
                "authentication": ["{did}#controller"],
                "@context": [
                    "https://www.w3.org/ns/did/v1",
                    "https://w3id.org/security/suites/secp256k1recovery-2020/v2"
                ]
            }}"#,
            did = DID
        );
        let parsed: DidDocument = serde_json::from_str(&shuffled).unwrap();
        assert_eq!(
            canonical_serialize(&parsed).unwrap(),
            canonical_serialize(&sample_document()).unwrap()
        );
    }

    #[test]
    fn test_context_order_is_significant() {
        let mut reordered = sample_document();
        reordered.context.reverse();
        assert_ne!(
            canonical_serialize(&reordered).unwrap(),
            canonical_serialize(&sample_document()).unwrap()
        );
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let mut document = sample_document();
        document.context.push("https://example.com/é/😀".to_string());
        let text = String::from_utf8(canonical_serialize(&document).unwrap()).unwrap();
        assert!(text.contains(r#""https://example.com/\u00e9/\ud83d\ude00""#));
        assert!(text.is_ascii());

        let mut with_del = sample_document();
        with_del.context.push("https://example.com/a\u{7f}b".to_string());
        let text = String::from_utf8(canonical_serialize(&with_del).unwrap()).unwrap();
        assert!(text.contains(r#""https://example.com/a\u007fb""#));
        assert!(!text.contains('\u{7f}'));
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        let mut no_id = sample_document();
        no_id.id.clear();
        assert!(matches!(canonical_serialize(&no_id), Err(DidError::Serialization(_))));

        let mut no_context = sample_document();
        no_context.context.clear();
        assert!(canonical_serialize(&no_context).is_err());

        let mut no_method = sample_document();
        no_method.verification_method.clear();
        assert!(canonical_serialize(&no_method).is_err());

        let mut two_methods = sample_document();
        let extra = two_methods.verification_method[0].clone();
        two_methods.verification_method.push(extra);
        assert!(canonical_serialize(&two_methods).is_err());

        let mut dangling = sample_document();
        dangling.authentication.push(format!("{}#other", DID));
        assert!(canonical_serialize(&dangling).is_err());

        let mut foreign_controller = sample_document();
        foreign_controller.verification_method[0].controller =
            "did:ethr:optimism:0x2222222222222222222222222222222222222222".to_string();
        assert!(canonical_serialize(&foreign_controller).is_err());
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let json = r#"{"@context": [], "id": "did:ethr:optimism:0x11"}"#;
        assert!(serde_json::from_str::<DidDocument>(json).is_err());
    }
}
