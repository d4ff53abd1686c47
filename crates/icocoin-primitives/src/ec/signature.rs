//! ECDSA signature with strict DER serialization and RFC6979 deterministic nonces.
//!
//! A script signature is the DER encoding of `(r, s)` followed by one
//! hash-type byte. Decoding is strict: every non-minimal or malformed shape
//! is rejected with its own [`DerError`] variant.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::PrehashVerifier;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::error::{Component, DerError};
use crate::sighash;
use crate::PrimitivesError;

/// The secp256k1 curve order N.
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// N / 2, the largest low-S value.
const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

/// Shortest possible DER signature: two one-byte integers.
const MIN_DER_LEN: usize = 8;

/// Longest possible DER signature: two padded 33-byte integers.
const MAX_DER_LEN: usize = 72;

/// An ECDSA signature, `0 < r, s < n`, held as big-endian 32-byte scalars.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

/// A signature together with the hash type it was made for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptSignature {
    pub signature: Signature,
    pub hash_type: u32,
}

impl Signature {
    /// Build a signature from its two scalars.
    ///
    /// # Arguments
    /// * `r` - The R scalar, big-endian.
    /// * `s` - The S scalar, big-endian.
    ///
    /// # Returns
    /// `Ok(Signature)`, or `ScalarOutOfRange` if either value is zero or not
    /// below the curve order.
    pub fn from_scalars(r: [u8; 32], s: [u8; 32]) -> Result<Self, PrimitivesError> {
        check_scalar(&r, Component::R)?;
        check_scalar(&s, Component::S)?;
        Ok(Signature { r, s })
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Whether S lies in the lower half of the order.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// The equivalent signature with S replaced by `n - s` when S is high.
    pub fn to_low_s(&self) -> Signature {
        if self.is_low_s() {
            return self.clone();
        }
        Signature {
            r: self.r,
            s: subtract_from_order(&self.s),
        }
    }

    /// Parse a strict DER signature without a trailing hash-type byte.
    ///
    /// # Arguments
    /// * `bytes` - `0x30 len 0x02 rlen r 0x02 slen s`.
    ///
    /// # Returns
    /// `Ok(Signature)`, or `PrimitivesError::Der` naming the first rule broken.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let body = parse_sequence(bytes)?;
        let integers = parse_integers(body)?;
        if integers.len() != 2 {
            return Err(DerError::IntegerCount(integers.len()).into());
        }
        let r = scalar_from_integer(integers[0], Component::R)?;
        let s = scalar_from_integer(integers[1], Component::S)?;
        Ok(Signature { r, s })
    }

    /// Serialize as minimal DER.
    ///
    /// S is written as stored; only signatures produced by [`PrivateKey::sign`]
    /// are guaranteed to be low-S.
    pub fn to_der(&self) -> Vec<u8> {
        let r = canonicalize_int(&self.r);
        let s = canonicalize_int(&self.s);

        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(SEQUENCE_TAG);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(INTEGER_TAG);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(INTEGER_TAG);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    /// DER encoding followed by the hash-type byte, as pushed in an unlocking script.
    ///
    /// # Returns
    /// The script signature, or `InvalidHashType` if `hash_type` is not one of
    /// ALL, NONE or SINGLE with an optional ANYONECANPAY bit.
    pub fn to_script_signature(&self, hash_type: u32) -> Result<Vec<u8>, PrimitivesError> {
        if !sighash::is_defined(hash_type) {
            return Err(PrimitivesError::InvalidHashType(hash_type));
        }
        let mut out = self.to_der();
        out.push(hash_type as u8);
        Ok(out)
    }

    /// Split a script signature into its signature and hash type.
    ///
    /// The hash type is checked before the DER body.
    pub fn parse_script_signature(bytes: &[u8]) -> Result<ScriptSignature, PrimitivesError> {
        let (&last, der) = bytes.split_last().ok_or(DerError::TooShort(0))?;
        let hash_type = u32::from(last);
        if !sighash::is_defined(hash_type) {
            tracing::debug!(hash_type, "rejecting script signature");
            return Err(PrimitivesError::InvalidHashType(hash_type));
        }
        let signature = Signature::from_der(der)?;
        Ok(ScriptSignature {
            signature,
            hash_type,
        })
    }

    /// Sign a digest with an RFC6979 nonce, normalizing to low S.
    pub(crate) fn sign(digest: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (k256_sig, _recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);

        Ok(Signature { r, s }.to_low_s())
    }

    /// Verify against a digest and public key. High-S signatures verify too.
    pub fn verify(&self, digest: &[u8; 32], pub_key: &PublicKey) -> bool {
        let k256_sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        let k256_sig = k256_sig.normalize_s().unwrap_or(k256_sig);
        pub_key
            .verifying_key()
            .verify_prehash(digest, &k256_sig)
            .is_ok()
    }
}

// ---------------------------------------------------------------------------
// Strict DER parse
// ---------------------------------------------------------------------------

/// Check the outer SEQUENCE and return its contents.
fn parse_sequence(bytes: &[u8]) -> Result<&[u8], DerError> {
    if bytes.len() < MIN_DER_LEN {
        return Err(DerError::TooShort(bytes.len()));
    }
    if bytes.len() > MAX_DER_LEN {
        return Err(DerError::TooLong(bytes.len()));
    }
    if bytes[0] != SEQUENCE_TAG {
        return Err(DerError::ExpectedSequence(bytes[0]));
    }
    let declared = bytes[1] as usize;
    if declared != bytes.len() - 2 {
        return Err(DerError::SequenceLength {
            declared,
            actual: bytes.len() - 2,
        });
    }
    Ok(&bytes[2..])
}

/// Read INTEGERs until the sequence body is exhausted.
fn parse_integers(mut body: &[u8]) -> Result<Vec<&[u8]>, DerError> {
    let mut integers = Vec::with_capacity(2);
    while !body.is_empty() {
        let (value, rest) = parse_integer(body, Component::at(integers.len()))?;
        integers.push(value);
        body = rest;
    }
    Ok(integers)
}

/// Read one INTEGER, returning its value bytes and the remaining input.
fn parse_integer(input: &[u8], component: Component) -> Result<(&[u8], &[u8]), DerError> {
    let tag = input[0];
    if tag != INTEGER_TAG {
        return Err(DerError::ExpectedInteger { component, tag });
    }
    let len = match input.get(1) {
        Some(&len) => len as usize,
        None => return Err(DerError::IntegerTooLong(component)),
    };
    let rest = &input[2..];
    if len == 0 {
        return Err(DerError::ZeroLength(component));
    }
    if len > rest.len() {
        return Err(DerError::IntegerTooLong(component));
    }
    let value = &rest[..len];
    if value[0] & 0x80 != 0 {
        return Err(DerError::Negative(component));
    }
    if len > 1 && value[0] == 0x00 && value[1] & 0x80 == 0 {
        return Err(DerError::ExcessivelyPadded(component));
    }
    Ok((value, &rest[len..]))
}

/// Convert a canonical positive INTEGER to a range-checked scalar.
fn scalar_from_integer(value: &[u8], component: Component) -> Result<[u8; 32], DerError> {
    let trimmed = match value {
        [0x00, rest @ ..] if !rest.is_empty() => rest,
        _ => value,
    };
    if trimmed.len() > 32 {
        return Err(DerError::ScalarOutOfRange(component));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    check_scalar(&out, component)?;
    Ok(out)
}

fn check_scalar(val: &[u8; 32], component: Component) -> Result<(), DerError> {
    if val.iter().all(|&b| b == 0) || *val >= CURVE_ORDER {
        return Err(DerError::ScalarOutOfRange(component));
    }
    Ok(())
}

/// Minimal big-endian INTEGER body: leading zeros stripped, one 0x00 kept
/// in front of a set high bit.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];

    if trimmed[0] & 0x80 != 0 {
        let mut out = Vec::with_capacity(trimmed.len() + 1);
        out.push(0x00);
        out.extend_from_slice(trimmed);
        out
    } else {
        trimmed.to_vec()
    }
}

/// N - val.
fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;
    for i in (0..32).rev() {
        let diff = CURVE_ORDER[i] as i32 - val[i] as i32 - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }
    result
}
