#![deny(missing_docs)]

//! icocoin protocol core.
//!
//! Re-exports the component crates for single-crate usage: keys and hashing
//! in `primitives`, scripts and addresses in `script`, transactions, the
//! builder and blocks in `transaction`.

pub use icocoin_primitives as primitives;
pub use icocoin_script as script;
pub use icocoin_transaction as transaction;

pub use icocoin_primitives::ec::KeyPair;
pub use icocoin_primitives::network::Network;
pub use icocoin_script::{Address, Script};
pub use icocoin_transaction::{Block, Transaction, TransactionBuilder};
