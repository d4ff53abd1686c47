//! 32-byte hash identifying a transaction or block.
//!
//! The bytes are held in internal order, the order they take on the wire and
//! the order the digest produces. Text forms (ids, JSON) show them reversed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a ChainHash in bytes.
pub const HASH_SIZE: usize = 32;

/// A transaction id, block id or merkle node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChainHash([u8; HASH_SIZE]);

impl ChainHash {
    /// Wrap 32 bytes given in internal order.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        ChainHash(bytes)
    }

    /// Create a hash from a slice in internal order.
    ///
    /// # Arguments
    /// * `bytes` - A slice that must be exactly 32 bytes.
    ///
    /// # Returns
    /// `Ok(ChainHash)`, or `InvalidHash` for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(ChainHash(arr))
    }

    /// Parse a 64-character hex id in display (reversed) order.
    ///
    /// # Arguments
    /// * `hex_str` - The id as printed by block explorers.
    ///
    /// # Returns
    /// `Ok(ChainHash)` holding the bytes in internal order.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(PrimitivesError::InvalidHash(format!(
                "expected {} hex characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        bytes.reverse();
        Ok(ChainHash(bytes))
    }

    /// Double SHA-256 of `data`, as a ChainHash.
    pub fn sha256d(data: &[u8]) -> Self {
        ChainHash(sha256d(data))
    }

    /// The bytes in internal order.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// The bytes in display order.
    pub fn to_reversed_bytes(&self) -> [u8; HASH_SIZE] {
        let mut out = self.0;
        out.reverse();
        out
    }
}

impl From<[u8; HASH_SIZE]> for ChainHash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        ChainHash(bytes)
    }
}

impl fmt::Display for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_reversed_bytes()))
    }
}

impl fmt::Debug for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainHash({})", self)
    }
}

impl FromStr for ChainHash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainHash::from_hex(s)
    }
}

impl Serialize for ChainHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChainHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_ID: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

    #[test]
    fn test_display_is_reversed() {
        let hash = ChainHash::from_hex(GENESIS_ID).unwrap();
        assert_eq!(hash.as_bytes()[0], 0x6f);
        assert_eq!(hash.as_bytes()[31], 0x00);
        assert_eq!(hash.to_string(), GENESIS_ID);
        assert_eq!(hex::encode(hash.to_reversed_bytes()), GENESIS_ID);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(ChainHash::from_hex("").is_err());
        assert!(ChainHash::from_hex(&GENESIS_ID[2..]).is_err());
        assert!(ChainHash::from_hex(&format!("{}00", GENESIS_ID)).is_err());
        let bad = format!("zz{}", &GENESIS_ID[2..]);
        assert!(matches!(
            ChainHash::from_hex(&bad),
            Err(PrimitivesError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(ChainHash::from_bytes(&[0u8; 31]).is_err());
        let hash = ChainHash::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(hash, ChainHash::new([7u8; 32]));
    }

    #[test]
    fn test_serde_hex_string() {
        let hash: ChainHash = GENESIS_ID.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", GENESIS_ID));
        let back: ChainHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
