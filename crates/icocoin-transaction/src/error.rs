use icocoin_primitives::{ErrorKind, PrimitivesError};
use icocoin_script::ScriptError;

use crate::broadcaster::BroadcastFailure;

/// Error types for transaction, builder and block operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Malformed or truncated binary/hex encoding.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Bytes left over after a complete transaction or block.
    #[error("trailing {0} bytes after end of data")]
    TrailingBytes(usize),

    #[error("input index {index} out of range ({count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// `SIGHASH_SINGLE` signing an input with no output at the same index.
    #[error("no output at index {index} for SIGHASH_SINGLE ({outputs} outputs)")]
    NoMatchingOutput { index: usize, outputs: usize },

    #[error("duplicate input {txid}:{vout}")]
    DuplicateInput { txid: String, vout: u32 },

    /// A signature already commits to the input set.
    #[error("no more inputs can be added")]
    InputsFrozen,

    /// A signature already commits to the output set.
    #[error("no more outputs can be added")]
    OutputsFrozen,

    /// A signature already commits to the lock time.
    #[error("lock time can no longer be changed")]
    LockTimeFrozen,

    #[error("key pair network does not match the builder's network")]
    NetworkMismatch,

    /// The redeem script does not hash to the known previous output script.
    #[error("redeem script does not match the previous output script")]
    RedeemScriptMismatch,

    /// The key does not own the pay-to-public-key-hash script being signed.
    #[error("key pair cannot sign for this input")]
    PubKeyHashMismatch,

    #[error("pay-to-script-hash input {0} requires a redeem script")]
    MissingRedeemScript(usize),

    /// The script being signed is not one the builder can assemble an input for.
    #[error("cannot sign script {0}")]
    UnsupportedScript(String),

    #[error("input {0} is already signed")]
    AlreadySigned(usize),

    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("input {0} is not signed")]
    UnsignedInput(usize),

    /// Rejection passed through from a broadcaster or faucet.
    #[error(transparent)]
    External(#[from] BroadcastFailure),

    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}

impl TransactionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::SerializationError(_) | TransactionError::TrailingBytes(_) => {
                ErrorKind::Parse
            }
            TransactionError::External(_) => ErrorKind::External,
            TransactionError::Script(e) => e.kind(),
            TransactionError::Primitives(e) => e.kind(),
            _ => ErrorKind::Validation,
        }
    }
}

impl From<hex::FromHexError> for TransactionError {
    fn from(e: hex::FromHexError) -> Self {
        TransactionError::SerializationError(format!("invalid hex: {}", e))
    }
}
