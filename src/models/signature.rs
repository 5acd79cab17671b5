// src/models/signature.rs
//! Recoverable secp256k1 signature in Ethereum's 65-byte layout.

use ethers_core::utils::hex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{DidError, Result};
use crate::utils::crypto::strip_hex_prefix;

/// `r (32) || s (32) || v (1)`.
///
/// `v` is 27 or 28 when produced by this crate. Signatures carrying a raw
/// recovery id (0 or 1) are accepted as well, since both forms are common in
/// the Ethereum ecosystem.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; Signature::LEN]);

impl Signature {
    pub const LEN: usize = 65;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Signature(bytes)
    }

    /// Fails with `Recovery` unless `bytes` is exactly 65 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            DidError::Recovery(format!(
                "signature must be {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Signature(array))
    }

    pub(crate) fn from_parts(rs: &[u8], v: u8) -> Self {
        let mut bytes = [0u8; Self::LEN];
        bytes[..64].copy_from_slice(rs);
        bytes[64] = v;
        Signature(bytes)
    }

    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    /// The `r || s` half without the recovery byte.
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Normalizes `v` to a recovery id in `{0, 1}`.
    pub fn recovery_id(&self) -> Result<u8> {
        match self.v() {
            0 | 1 => Ok(self.v()),
            27 | 28 => Ok(self.v() - 27),
            other => Err(DidError::Recovery(format!(
                "unsupported recovery byte {}",
                other
            ))),
        }
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Signature {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(strip_hex_prefix(s.trim()))
            .map_err(|e| DidError::Recovery(format!("signature is not hex: {}", e)))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_hex()).finish()
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_prefix() {
        let text = format!("{}{}1b", "11".repeat(32), "22".repeat(32));
        let plain: Signature = text.parse().unwrap();
        let prefixed: Signature = format!("0x{}", text).parse().unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain.r(), &[0x11; 32]);
        assert_eq!(plain.s(), &[0x22; 32]);
        assert_eq!(plain.v(), 27);
        assert_eq!(plain.recovery_id().unwrap(), 0);
        assert_eq!(plain.to_hex(), format!("0x{}", text));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            "0x1234".parse::<Signature>(),
            Err(DidError::Recovery(_))
        ));
        assert!(Signature::from_slice(&[0u8; 64]).is_err());
        assert!("not hex at all".parse::<Signature>().is_err());
    }

    #[test]
    fn test_recovery_byte_normalization() {
        let mut bytes = [0u8; Signature::LEN];
        bytes[64] = 1;
        assert_eq!(Signature::from_bytes(bytes).recovery_id().unwrap(), 1);
        bytes[64] = 28;
        assert_eq!(Signature::from_bytes(bytes).recovery_id().unwrap(), 1);
        bytes[64] = 35;
        assert!(Signature::from_bytes(bytes).recovery_id().is_err());
    }

    #[test]
    fn test_json_is_hex_string() {
        let signature = Signature::from_parts(&[0xab; 64], 28);
        let json = serde_json::to_string(&signature).unwrap();
        assert_eq!(json, format!("\"0x{}1c\"", "ab".repeat(64)));
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signature);
    }
}
