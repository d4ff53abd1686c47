//! Digest functions used for ids, checksums and key hashing.
//!
//! `sha256d` names transactions and blocks and frames base58check payloads;
//! `hash160` condenses public keys and redeem scripts into 20-byte hashes.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute SHA-256(SHA-256(data)).
///
/// The result is in internal byte order; ids are shown to users reversed.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte double-SHA-256 digest.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute RIPEMD-160(SHA-256(data)).
///
/// # Arguments
/// * `data` - Byte slice to hash, typically a serialized public key or script.
///
/// # Returns
/// A 20-byte digest.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}
