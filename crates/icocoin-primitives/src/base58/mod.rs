//! Base58 and Base58Check codecs.
//!
//! Raw base58 uses the Bitcoin alphabet, with every leading zero byte kept as
//! a leading `1`. Base58Check frames a version byte and payload with the first
//! four bytes of their double SHA-256, and is the text form of addresses and
//! WIF keys.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the checksum appended by [`check_encode`].
pub const CHECKSUM_LEN: usize = 4;

/// Smallest decodable Base58Check string: version byte plus checksum.
pub const MIN_CHECK_LEN: usize = 1 + CHECKSUM_LEN;

/// Largest decodable Base58Check string, sized for a serialized extended
/// key (78 bytes) plus checksum. Addresses and WIF keys are shorter.
pub const MAX_CHECK_LEN: usize = 78 + CHECKSUM_LEN;

/// Encode a byte slice to a Base58 string.
///
/// # Arguments
/// * `data` - The bytes to encode.
///
/// # Returns
/// A Base58-encoded string.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Arguments
/// * `s` - The Base58 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `version || payload || checksum` as Base58.
///
/// # Arguments
/// * `version` - The leading version byte (address kind or WIF marker).
/// * `payload` - The bytes following the version.
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&data)
}

/// Decode a Base58Check string into its version byte and payload.
///
/// Length is checked before the checksum so that truncated and oversized
/// input report a length error rather than a checksum error.
///
/// # Arguments
/// * `s` - The Base58Check string to decode.
///
/// # Returns
/// `Ok((version, payload))`, or `Base58TooShort`, `Base58TooLong`,
/// `ChecksumMismatch` or `InvalidBase58`.
pub fn check_decode(s: &str) -> Result<(u8, Vec<u8>), PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < MIN_CHECK_LEN {
        return Err(PrimitivesError::Base58TooShort(decoded.len()));
    }
    if decoded.len() > MAX_CHECK_LEN {
        return Err(PrimitivesError::Base58TooLong(decoded.len()));
    }

    let (data, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    if checksum != &sha256d(data)[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok((data[0], data[1..].to_vec()))
}
