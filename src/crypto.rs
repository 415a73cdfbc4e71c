//! Hex and digest primitives for CryptoJoule

use crate::error::{JouleError, Result};
use sha2::{Digest, Sha256};

/// Decode a pure-hex field into bytes.
///
/// Mixed case is accepted. Empty strings, odd lengths and any non-hex
/// character are rejected with [`JouleError::InvalidInputFormat`], naming
/// `field` in the message.
pub fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    if value.is_empty() {
        return Err(JouleError::invalid_input(field, "empty hex string"));
    }
    if let Some((pos, c)) = value.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(JouleError::invalid_input(
            field,
            format!("non-hex character {:?} at position {}", c, pos),
        ));
    }
    if value.len() % 2 != 0 {
        return Err(JouleError::invalid_input(
            field,
            format!("odd number of hex characters ({})", value.len()),
        ));
    }
    hex::decode(value).map_err(|e| JouleError::invalid_input(field, e.to_string()))
}

/// Two lowercase, zero-padded hex characters for one byte.
pub fn encode_byte(byte: u8) -> String {
    format!("{:02x}", byte)
}

/// SHA-256 of the UTF-8 bytes of `data`.
pub fn sha256(data: &str) -> [u8; 32] {
    Sha256::digest(data.as_bytes()).into()
}

/// Serde adapter that writes a `u8` as a two-character hex string.
pub mod byte_hex {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(byte: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_byte(*byte))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.len() != 2 {
            return Err(de::Error::custom(format!(
                "expected 2 hex characters, got {:?}",
                s
            )));
        }
        u8::from_str_radix(&s, 16).map_err(de::Error::custom)
    }
}
