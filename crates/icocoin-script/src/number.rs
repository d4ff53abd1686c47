//! Script number codec.
//!
//! Numbers pushed in scripts are little-endian sign-magnitude: the high bit
//! of the last byte is the sign, and zero is the empty byte string. This is
//! how lock times are embedded in timelocked redeem scripts.

use crate::ScriptError;

/// Longest encoding `decode` can represent in an `i64`.
pub const MAX_NUM_LEN: usize = 8;

/// Minimal encoding of `value`.
pub fn encode(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    // The top bit of the last byte is the sign; add a byte if it is taken.
    let last = out.len() - 1;
    if out[last] & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        out[last] |= 0x80;
    }
    out
}

/// Decode a script number.
///
/// # Arguments
/// * `bytes` - The encoded number.
/// * `max_len` - Longest accepted encoding, at most [`MAX_NUM_LEN`].
/// * `require_minimal` - Reject encodings with a superfluous trailing byte.
///
/// # Returns
/// The value, or `NumberTooLong` / `NonMinimalNumber`.
pub fn decode(bytes: &[u8], max_len: usize, require_minimal: bool) -> Result<i64, ScriptError> {
    let max = max_len.min(MAX_NUM_LEN);
    if bytes.len() > max {
        return Err(ScriptError::NumberTooLong {
            len: bytes.len(),
            max,
        });
    }
    if require_minimal && !is_minimal(bytes) {
        return Err(ScriptError::NonMinimalNumber(bytes.to_vec()));
    }
    let Some((&last, _)) = bytes.split_last() else {
        return Ok(0);
    };

    let mut magnitude: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        magnitude |= u64::from(b) << (8 * i);
    }
    let sign_bit = 0x80u64 << (8 * (bytes.len() - 1));
    if last & 0x80 != 0 {
        Ok(-((magnitude & !sign_bit) as i64))
    } else {
        Ok(magnitude as i64)
    }
}

/// Whether the last byte carries value bits, or is needed for the sign.
fn is_minimal(bytes: &[u8]) -> bool {
    match bytes {
        [] => true,
        [.., last] if last & 0x7f != 0 => true,
        [_] => false,
        [.., prev, _] => prev & 0x80 != 0,
    }
}
