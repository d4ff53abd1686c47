use icocoin_primitives::{ErrorKind, PrimitivesError};

/// Errors from script compilation, decompilation, templates and addresses.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A push declares more bytes than remain in the script.
    #[error("truncated push at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedPush {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Push payload longer than a 4-byte length field can describe.
    #[error("push of {0} bytes is too large")]
    DataTooBig(usize),

    /// An ASM token is neither an opcode name nor hex.
    #[error("invalid ASM token '{0}'")]
    InvalidAsmToken(String),

    /// A script number is longer than the caller allows.
    #[error("script number of {len} bytes exceeds limit of {max}")]
    NumberTooLong { len: usize, max: usize },

    /// A script number carries a superfluous trailing byte.
    #[error("script number {0:02x?} is not minimally encoded")]
    NonMinimalNumber(Vec<u8>),

    /// Address payload is not a 20-byte hash.
    #[error("invalid address length: payload of {0} bytes")]
    InvalidAddressLength(usize),

    /// Address version byte belongs to none of the allowed networks.
    #[error("address version {0:#04x} is not recognized")]
    UnknownAddressVersion(u8),

    /// No address template matches the output script.
    #[error("{0} has no matching address template")]
    NoMatchingTemplate(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}

impl ScriptError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScriptError::UnknownAddressVersion(_) | ScriptError::NoMatchingTemplate(_) => {
                ErrorKind::Validation
            }
            ScriptError::Primitives(e) => e.kind(),
            _ => ErrorKind::Parse,
        }
    }
}

impl From<hex::FromHexError> for ScriptError {
    fn from(e: hex::FromHexError) -> Self {
        ScriptError::InvalidHex(e.to_string())
    }
}
