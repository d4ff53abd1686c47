//! secp256k1 public point with SEC1 compressed/uncompressed encodings.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key (prefix + x).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key (prefix + x + y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// A secp256k1 public key.
///
/// Equality compares the point, not the encoding it was parsed from.
#[derive(Clone, Copy)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1-encoded point.
    ///
    /// Only the two standard encodings are accepted: 33 bytes starting with
    /// 0x02/0x03, or 65 bytes starting with 0x04.
    ///
    /// # Arguments
    /// * `bytes` - The encoded point.
    ///
    /// # Returns
    /// `Ok(PublicKey)`, or `InvalidPublicKey` for other shapes and off-curve points.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if !is_canonical_encoding(bytes) {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "unsupported encoding of {} bytes",
                bytes.len()
            )));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| PrimitivesError::InvalidPublicKey("point not on curve".to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a hex-encoded SEC1 point.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize in compressed form (33 bytes).
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed form (65 bytes).
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in the requested form.
    ///
    /// # Arguments
    /// * `compressed` - Choose the 33-byte form when true, 65-byte otherwise.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            self.to_uncompressed().to_vec()
        }
    }

    /// Compressed encoding as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Hash160 of the chosen encoding.
    ///
    /// The two encodings of one point hash differently and so pay to
    /// different addresses.
    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        hash160(&self.to_bytes(compressed))
    }

    /// Verify a signature over a 32-byte digest.
    pub fn verify(&self, digest: &[u8; 32], sig: &Signature) -> bool {
        sig.verify(digest, self)
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

/// Whether `bytes` has the length and prefix of a standard SEC1 encoding.
///
/// Does not check that the point lies on the curve.
pub fn is_canonical_encoding(bytes: &[u8]) -> bool {
    match bytes.first() {
        Some(0x02) | Some(0x03) => bytes.len() == COMPRESSED_LEN,
        Some(0x04) => bytes.len() == UNCOMPRESSED_LEN,
        _ => false,
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}
