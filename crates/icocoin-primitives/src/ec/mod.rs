//! Elliptic curve cryptography on secp256k1.
//!
//! Private and public keys, ECDSA signatures with a strict DER codec, and
//! network-bound key pairs with WIF import/export.

pub mod key_pair;
pub mod private_key;
pub mod public_key;
pub mod signature;

pub use key_pair::KeyPair;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{ScriptSignature, Signature};
