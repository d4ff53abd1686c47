/// icocoin transactions: the wire model, legacy signature hashing, a staged
/// builder, blocks, and the traits network services implement.

pub mod block;
pub mod broadcaster;
pub mod builder;
pub mod input;
pub mod output;
pub mod sighash;
pub mod transaction;

mod error;
pub use block::{Block, BlockHeader};
pub use broadcaster::{BroadcastFailure, BroadcastSuccess, Broadcaster, Faucet, Unspent};
pub use builder::TransactionBuilder;
pub use error::TransactionError;
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use transaction::Transaction;
