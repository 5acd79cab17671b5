// src/wallet/key_management.rs
//! Cryptographic key management for DID issuance.
//!
//! Provides generation and import of the secp256k1 key pair an identity is
//! bound to, and derivation of its Ethereum address.
//!
//! Uses the following cryptographic primitives:
//! - secp256k1 curve (via `k256` crate)
//! - Keccak-256 address derivation (via `ethers` crate)
//! - Cryptographically secure random number generation (via `rand`)

use ethers_core::types::Address;
use ethers_core::utils::hex;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::zeroize::Zeroize;
use k256::FieldBytes;
use log::debug;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;

use crate::error::{DidError, Result};
use crate::models::identity::SecretMaterial;
use crate::utils::crypto::{address_of, format_address, strip_hex_prefix};

/// Upper bound on redraws when the random bytes are not a valid scalar.
///
/// A 32-byte draw is out of range with probability ~2^-128, so hitting this
/// bound means the source is broken rather than unlucky.
const MAX_SCALAR_DRAWS: usize = 8;

/// A secp256k1 key pair and its derived address.
///
/// The address is computed from the public key on construction and cannot be
/// set any other way.
///
/// # Security Notes
/// - The private key is only exposed through [`KeyPair::private_key_bytes`]
///   and [`KeyPair::into_secret`]
/// - `Debug` output never contains key material
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl KeyPair {
    /// Generates a new key pair from the operating system's entropy source.
    ///
    /// # Errors
    /// `Entropy` if the OS random source is unavailable.
    pub fn generate() -> Result<Self> {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a new key pair from a caller-supplied random source.
    ///
    /// # Arguments
    /// * `rng` - Cryptographically secure RNG. Each caller owns its own, so
    ///   concurrent generation needs no shared state.
    ///
    /// # Errors
    /// `Entropy` if `rng` fails, or keeps yielding invalid scalars.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut candidate = [0u8; 32];
        for _ in 0..MAX_SCALAR_DRAWS {
            rng.try_fill_bytes(&mut candidate)
                .map_err(|e| DidError::Entropy(e.to_string()))?;

            // Zero and values >= the curve order are rejected; draw again.
            let parsed = SigningKey::from_slice(&candidate);
            candidate.zeroize();
            if let Ok(signing_key) = parsed {
                let key_pair = Self::from_signing_key(signing_key);
                debug!("generated key pair for {}", format_address(&key_pair.address));
                return Ok(key_pair);
            }
        }
        Err(DidError::Entropy(format!(
            "no valid secp256k1 scalar after {} draws",
            MAX_SCALAR_DRAWS
        )))
    }

    /// Imports a raw 32-byte private key.
    ///
    /// # Errors
    /// `Signing` if the bytes are not a valid secp256k1 scalar.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(DidError::Signing(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        SigningKey::from_slice(bytes)
            .map(Self::from_signing_key)
            .map_err(|_| DidError::Signing("malformed secp256k1 private key".into()))
    }

    /// Imports a hex private key, with or without the `0x` prefix.
    pub fn from_private_key_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(strip_hex_prefix(text.trim()))
            .map_err(|_| DidError::Signing("private key is not valid hex".into()))?;
        Self::from_private_key(&bytes)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_of(signing_key.verifying_key());
        KeyPair {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Raw private key scalar (big-endian).
    pub fn private_key_bytes(&self) -> FieldBytes {
        self.signing_key.to_bytes()
    }

    /// Hands the private key over to the caller as [`SecretMaterial`].
    pub fn into_secret(self) -> SecretMaterial {
        SecretMaterial::new(self.signing_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &format_address(&self.address))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// RNG whose backing source is gone.
    struct OfflineRng;

    impl RngCore for OfflineRng {
        fn next_u32(&mut self) -> u32 {
            unreachable!()
        }

        fn next_u64(&mut self) -> u64 {
            unreachable!()
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            unreachable!()
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    impl CryptoRng for OfflineRng {}

    /// RNG that only ever yields zero bytes, which is never a valid scalar.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    #[test]
    fn test_generate_yields_distinct_keys() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        assert_ne!(a.address(), b.address());
        assert_ne!(a.private_key_bytes(), b.private_key_bytes());
    }

    #[test]
    fn test_address_is_derived_from_key() {
        let mut rng = StdRng::seed_from_u64(7);
        let key_pair = KeyPair::generate_with(&mut rng).unwrap();
        let imported = KeyPair::from_private_key(&key_pair.private_key_bytes()).unwrap();
        assert_eq!(imported.address(), key_pair.address());
    }

    #[test]
    fn test_known_private_key_address() {
        let key_pair = KeyPair::from_private_key_hex(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        assert_eq!(
            format_address(&key_pair.address()),
            "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"
        );
    }

    #[test]
    fn test_entropy_failure_is_reported() {
        assert!(matches!(
            KeyPair::generate_with(&mut OfflineRng),
            Err(DidError::Entropy(_))
        ));
        assert!(matches!(
            KeyPair::generate_with(&mut ZeroRng),
            Err(DidError::Entropy(_))
        ));
    }

    #[test]
    fn test_malformed_private_key() {
        assert!(matches!(
            KeyPair::from_private_key(&[0u8; 32]),
            Err(DidError::Signing(_))
        ));
        assert!(matches!(
            KeyPair::from_private_key(&[1u8; 31]),
            Err(DidError::Signing(_))
        ));
        assert!(matches!(
            KeyPair::from_private_key_hex("0xnothex"),
            Err(DidError::Signing(_))
        ));
    }

    #[test]
    fn test_debug_hides_private_key() {
        let key_pair = KeyPair::from_private_key_hex(
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        let rendered = format!("{:?}", key_pair);
        assert!(rendered.contains("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23"));
        assert!(!rendered.contains("4c0883a6"));
    }
}
