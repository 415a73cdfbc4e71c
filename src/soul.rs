//! Soul signatures: the 256-bit seed every downstream value is derived from.

use crate::crypto::{decode_hex, sha256};
use crate::error::{JouleError, Result};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Byte length of a soul signature.
pub const SOUL_SIGNATURE_LEN: usize = 32;

/// A SHA-256 digest over the concatenated identifying fields of a block or
/// a transaction. Displays and serializes as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoulSignature([u8; SOUL_SIGNATURE_LEN]);

impl SoulSignature {
    /// Concatenate the display forms of `parts` and hash the result.
    pub fn derive(parts: &[&dyn fmt::Display]) -> Self {
        let joined: String = parts.iter().map(|p| p.to_string()).collect();
        SoulSignature(sha256(&joined))
    }

    /// Block-scoped signature over `block_hash ++ merkle_root ++ block_time`.
    ///
    /// Both digests must be pure hex. The merkle root is folded to lowercase
    /// before hashing; the block hash is hashed as given.
    pub fn for_block(block_hash: &str, merkle_root: &str, block_time: u64) -> Result<Self> {
        decode_hex("block hash", block_hash)?;
        decode_hex("merkle root", merkle_root)?;
        let merkle_root = merkle_root.to_ascii_lowercase();
        Ok(Self::derive(&[&block_hash, &merkle_root, &block_time]))
    }

    /// Transaction-scoped signature over `block_soul ++ txn_hash ++ block_time`.
    pub fn for_transaction(block_soul: &SoulSignature, txn_hash: &str, block_time: u64) -> Result<Self> {
        decode_hex("transaction hash", txn_hash)?;
        Ok(Self::derive(&[block_soul, &txn_hash, &block_time]))
    }

    pub fn from_bytes(bytes: [u8; SOUL_SIGNATURE_LEN]) -> Self {
        SoulSignature(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SOUL_SIGNATURE_LEN] =
            bytes.try_into().map_err(|_| JouleError::InvalidLength {
                expected: SOUL_SIGNATURE_LEN,
                actual: bytes.len(),
            })?;
        Ok(SoulSignature(array))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_slice(&decode_hex("soul signature", s)?)
    }

    pub fn as_bytes(&self) -> &[u8; SOUL_SIGNATURE_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SoulSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for SoulSignature {
    type Err = JouleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for SoulSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SoulSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::sha256;

    const BLOCK_HASH: &str = "00000000000000000002a7c4c1e48d76c5a37902165a270156b7a8d72728a054";
    const MERKLE_ROOT: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    #[test]
    fn test_block_signature_is_hash_of_concatenation() {
        let soul = SoulSignature::for_block(BLOCK_HASH, MERKLE_ROOT, 1_700_000_000).unwrap();
        let expected = sha256(&format!("{}{}{}", BLOCK_HASH, MERKLE_ROOT, 1_700_000_000u64));
        assert_eq!(soul.as_bytes(), &expected);
        assert_eq!(soul.to_hex().len(), 64);
    }

    #[test]
    fn test_block_signature_lowercases_merkle_root() {
        let lower = SoulSignature::for_block(BLOCK_HASH, MERKLE_ROOT, 42).unwrap();
        let upper =
            SoulSignature::for_block(BLOCK_HASH, &MERKLE_ROOT.to_uppercase(), 42).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_single_character_change_changes_signature() {
        let a = SoulSignature::for_block(BLOCK_HASH, MERKLE_ROOT, 42).unwrap();
        let b = SoulSignature::for_block(BLOCK_HASH, MERKLE_ROOT, 43).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_transaction_signature_chains_block_signature() {
        let block = SoulSignature::for_block(BLOCK_HASH, MERKLE_ROOT, 42).unwrap();
        let txn = SoulSignature::for_transaction(&block, MERKLE_ROOT, 42).unwrap();
        let expected = sha256(&format!("{}{}{}", block.to_hex(), MERKLE_ROOT, 42));
        assert_eq!(txn.as_bytes(), &expected);
    }

    #[test]
    fn test_non_hex_merkle_root_fails_fast() {
        let err = SoulSignature::for_block(BLOCK_HASH, "not-hex", 42).unwrap_err();
        assert!(matches!(err, JouleError::InvalidInputFormat { .. }));
    }

    #[test]
    fn test_from_hex_checks_length() {
        let err = SoulSignature::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            JouleError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let soul = SoulSignature::from_bytes([0xab; 32]);
        let json = serde_json::to_string(&soul).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let back: SoulSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, soul);
    }
}
