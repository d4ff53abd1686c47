//! icocoin protocol primitives.
//!
//! The foundation the script and transaction crates build on:
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
//! - Chain hash type for transaction and block identification
//! - Little-endian wire reader/writer and VarInt
//! - Base58 and Base58Check
//! - Network version bytes
//! - Signature-hash type flags
//! - secp256k1 keys, strict DER signatures, and WIF key pairs

pub mod base58;
pub mod chainhash;
pub mod ec;
pub mod hash;
pub mod network;
pub mod sighash;
pub mod util;

mod error;
pub use error::{Component, DerError, ErrorKind, PrimitivesError};
