// src/services/signature_engine.rs
//! Recoverable ECDSA signing and address recovery.
//!
//! Both directions hash the message with the EIP-191 personal-message prefix
//! before touching the curve, so a signed DID Document can never be mistaken
//! for a raw transaction. Signatures carry the recovery id, which lets
//! [`recover_address`] rebuild the signer's public key (and address) from the
//! message and signature alone.
//!
//! There is no `verify -> bool` here: verification is
//! `recover_address(message, signature) == expected`, composed by
//! [`crate::services::verifier`], so callers can log the recovered address.

use ethers_core::types::Address;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use log::debug;

use crate::error::{DidError, Result};
use crate::models::signature::Signature;
use crate::utils::crypto::{address_of, format_address, personal_message_digest};

/// Ethereum's offset for the recovery byte (`v = 27 + recovery_id`).
const ETHEREUM_V_OFFSET: u8 = 27;

/// Signs `message` with a raw secp256k1 private key.
///
/// # Arguments
/// * `message` - Bytes to sign, usually a canonical DID Document
/// * `private_key` - 32-byte big-endian secret scalar
///
/// # Returns
/// 65-byte `r || s || v` signature with low `s` and `v` in `{27, 28}`.
/// Signing is deterministic (RFC 6979): the same key and message always give
/// the same signature.
///
/// # Errors
/// `Signing` if the key is not a valid secp256k1 scalar.
pub fn sign(message: &[u8], private_key: &[u8]) -> Result<Signature> {
    if private_key.len() != 32 {
        return Err(DidError::Signing(format!(
            "private key must be 32 bytes, got {}",
            private_key.len()
        )));
    }
    let signing_key = SigningKey::from_slice(private_key)
        .map_err(|_| DidError::Signing("malformed secp256k1 private key".into()))?;

    let digest = personal_message_digest(message);
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| DidError::Signing(e.to_string()))?;

    debug!("signed {} byte message", message.len());
    Ok(Signature::from_parts(
        &signature.to_bytes(),
        recovery_id.to_byte() + ETHEREUM_V_OFFSET,
    ))
}

/// Recovers the address that produced `signature` over `message`.
///
/// # Errors
/// `Recovery` if:
/// - the recovery byte is not 0, 1, 27 or 28
/// - `r` or `s` is zero or not below the curve order
/// - `s` is in the upper half of the order (malleable form)
/// - no curve point can be recovered
pub fn recover_address(message: &[u8], signature: &Signature) -> Result<Address> {
    let recovery_id = RecoveryId::from_byte(signature.recovery_id()?)
        .ok_or_else(|| DidError::Recovery("invalid recovery id".into()))?;
    let ecdsa_signature = EcdsaSignature::from_slice(signature.rs())
        .map_err(|_| DidError::Recovery("r or s out of range".into()))?;
    if ecdsa_signature.normalize_s().is_some() {
        return Err(DidError::Recovery("non-canonical (high s) signature".into()));
    }

    let digest = personal_message_digest(message);
    let public_key =
        VerifyingKey::recover_from_prehash(digest.as_bytes(), &ecdsa_signature, recovery_id)
            .map_err(|e| DidError::Recovery(e.to_string()))?;

    let address = address_of(&public_key);
    debug!("recovered signer {}", format_address(&address));
    Ok(address)
}
