use std::fmt;

/// Coarse classification shared by every error type in the workspace.
///
/// Callers use it to decide how to react without matching on every variant:
/// parse errors mean the input bytes or text are malformed, validation errors
/// mean well-formed input was rejected by a rule, and external errors come
/// back unchanged from a collaborator such as a broadcast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed bytes or text at a codec boundary.
    Parse,
    /// Syntactically valid input rejected by a semantic rule.
    Validation,
    /// Failure reported by something outside the core.
    External,
}

/// Which integer of a DER signature an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// The first integer.
    R,
    /// The second integer.
    S,
    /// Any integer past the second, by zero-based position.
    Extra(usize),
}

impl Component {
    pub(crate) fn at(index: usize) -> Self {
        match index {
            0 => Component::R,
            1 => Component::S,
            n => Component::Extra(n),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::R => write!(f, "R"),
            Component::S => write!(f, "S"),
            Component::Extra(n) => write!(f, "integer #{}", n),
        }
    }
}

/// Strict DER decoding failures, one per rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerError {
    #[error("DER sequence length is too short: {0} bytes")]
    TooShort(usize),

    #[error("DER sequence length is too long: {0} bytes")]
    TooLong(usize),

    #[error("expected DER sequence, found tag {0:#04x}")]
    ExpectedSequence(u8),

    #[error("DER sequence length is invalid: declared {declared}, actual {actual}")]
    SequenceLength { declared: usize, actual: usize },

    #[error("expected DER integer for {component}, found tag {tag:#04x}")]
    ExpectedInteger { component: Component, tag: u8 },

    #[error("{0} length is zero")]
    ZeroLength(Component),

    #[error("{0} length is too long")]
    IntegerTooLong(Component),

    #[error("{0} value is negative")]
    Negative(Component),

    #[error("{0} value excessively padded")]
    ExcessivelyPadded(Component),

    #[error("expected 2 DER integers, found {0}")]
    IntegerCount(usize),

    #[error("{0} value is out of range for secp256k1")]
    ScalarOutOfRange(Component),
}

/// Unified error type for all primitives operations.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error(transparent)]
    Der(#[from] DerError),

    #[error("invalid hashType {0:#x}")]
    InvalidHashType(u32),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("base58check payload too short: {0} bytes")]
    Base58TooShort(usize),

    #[error("base58check payload too long: {0} bytes")]
    Base58TooLong(usize),

    #[error("invalid checksum")]
    ChecksumMismatch,

    #[error("invalid network version {0:#04x}")]
    InvalidNetworkVersion(u8),

    #[error("invalid WIF length {0}")]
    InvalidWifLength(usize),

    #[error("invalid compression flag {0:#04x}")]
    InvalidCompressionFlag(u8),

    #[error("missing private key")]
    MissingPrivateKey,

    #[error("digest must be 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl PrimitivesError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrimitivesError::InvalidNetworkVersion(_)
            | PrimitivesError::InvalidCompressionFlag(_)
            | PrimitivesError::MissingPrivateKey
            | PrimitivesError::InvalidDigestLength(_)
            | PrimitivesError::InvalidPrivateKey(_) => ErrorKind::Validation,
            _ => ErrorKind::Parse,
        }
    }
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PrimitivesError::ChecksumMismatch.kind(), ErrorKind::Parse);
        assert_eq!(
            PrimitivesError::Der(DerError::Negative(Component::S)).kind(),
            ErrorKind::Parse
        );
        assert_eq!(
            PrimitivesError::InvalidNetworkVersion(0x42).kind(),
            ErrorKind::Validation
        );
        assert_eq!(PrimitivesError::MissingPrivateKey.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_der_error_messages() {
        assert_eq!(
            DerError::ExcessivelyPadded(Component::R).to_string(),
            "R value excessively padded"
        );
        assert_eq!(DerError::Negative(Component::S).to_string(), "S value is negative");
        assert_eq!(DerError::ZeroLength(Component::S).to_string(), "S length is zero");
        assert_eq!(
            DerError::IntegerTooLong(Component::Extra(2)).to_string(),
            "integer #2 length is too long"
        );
    }
}
