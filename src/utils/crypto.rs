// src/utils/crypto.rs
//! Cryptographic utilities optimized for blockchain compatibility.
//!
//! Uses Keccak-256 (Ethereum's standard hash function) for all operations.

use ethers_core::types::{Address, H256};
use ethers_core::utils::{hash_message, hex, keccak256, public_key_to_address};
use k256::ecdsa::VerifyingKey;

use crate::error::{DidError, Result};

/// Computes a Keccak-256 hash of the input data (Ethereum-compatible).
///
/// # Arguments
/// * `data` - Binary data to hash (as bytes slice)
///
/// # Returns
/// Fixed-size 32-byte array (`[u8; 32]`) containing the hash.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Computes the EIP-191 personal-message digest of `message`.
///
/// The payload is prefixed with `"\x19Ethereum Signed Message:\n" + len`
/// before hashing, so a signed identity document can never be replayed as a
/// raw transaction.
pub fn personal_message_digest(message: &[u8]) -> H256 {
    hash_message(message)
}

/// Derives the Ethereum address of a secp256k1 public key.
///
/// `keccak256(uncompressed_point[1..])[12..]`
pub fn address_of(public_key: &VerifyingKey) -> Address {
    public_key_to_address(public_key)
}

/// Renders an address as lowercase `0x`-prefixed hex of fixed 20-byte width.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Builds an [`Address`] from raw bytes, rejecting anything but 20 bytes.
pub fn address_from_slice(bytes: &[u8]) -> Result<Address> {
    if bytes.len() != Address::len_bytes() {
        return Err(DidError::InvalidAddress(format!(
            "expected {} bytes, got {}",
            Address::len_bytes(),
            bytes.len()
        )));
    }
    Ok(Address::from_slice(bytes))
}

/// Parses hex address text, with or without the `0x` prefix, in any case.
///
/// Hex addresses are not case-sensitive identities, so `0xABCD...` and
/// `0xabcd...` parse to the same [`Address`]. EIP-55 checksums are not
/// enforced.
pub fn parse_address(text: &str) -> Result<Address> {
    let digits = strip_hex_prefix(text.trim());
    let bytes = hex::decode(digits)
        .map_err(|e| DidError::InvalidAddress(format!("`{}`: {}", text, e)))?;
    address_from_slice(&bytes)
}

/// Case-insensitive comparison of two hex address strings.
///
/// Malformed input never matches.
pub fn addresses_match(a: &str, b: &str) -> bool {
    match (parse_address(a), parse_address(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub(crate) fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}
