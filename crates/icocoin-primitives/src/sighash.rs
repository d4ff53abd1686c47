//! Signature-hash type flags.
//!
//! The low five bits select which outputs a signature commits to; the
//! `ANYONECANPAY` bit additionally drops every input but the signed one.

/// Commit to every output.
pub const SIGHASH_ALL: u32 = 0x01;

/// Commit to no outputs.
pub const SIGHASH_NONE: u32 = 0x02;

/// Commit only to the output at the signed input's index.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Commit only to the signed input.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask selecting the base mode.
pub const SIGHASH_BASE_MASK: u32 = 0x1f;

/// Base mode of a hash type, with the ANYONECANPAY bit stripped.
pub fn base_type(hash_type: u32) -> u32 {
    hash_type & SIGHASH_BASE_MASK
}

/// Whether the ANYONECANPAY bit is set.
pub fn is_anyone_can_pay(hash_type: u32) -> bool {
    hash_type & SIGHASH_ANYONECANPAY != 0
}

/// Whether a hash type may be appended to a script signature.
///
/// Only ALL, NONE and SINGLE, each optionally with ANYONECANPAY, qualify.
pub fn is_defined(hash_type: u32) -> bool {
    matches!(
        hash_type & !SIGHASH_ANYONECANPAY,
        SIGHASH_ALL | SIGHASH_NONE | SIGHASH_SINGLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_hash_types() {
        for base in [SIGHASH_ALL, SIGHASH_NONE, SIGHASH_SINGLE] {
            assert!(is_defined(base));
            assert!(is_defined(base | SIGHASH_ANYONECANPAY));
        }
        assert!(!is_defined(0x00));
        assert!(!is_defined(0x04));
        assert!(!is_defined(0x41));
        assert!(!is_defined(SIGHASH_ANYONECANPAY));
    }

    #[test]
    fn test_base_type_and_flag() {
        assert_eq!(base_type(SIGHASH_SINGLE | SIGHASH_ANYONECANPAY), SIGHASH_SINGLE);
        assert!(is_anyone_can_pay(0x81));
        assert!(!is_anyone_can_pay(0x01));
    }
}
