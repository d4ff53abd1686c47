//! Interfaces to the network services a wallet talks to.
//!
//! The library only produces finished transactions. Funding an address and
//! relaying a transaction are done by implementations of these traits, and
//! whatever they report is handed back to the caller as is.

use std::fmt;

use serde::{Deserialize, Serialize};

use icocoin_primitives::chainhash::ChainHash;
use icocoin_script::Address;

use crate::transaction::Transaction;

/// An unspent output created by a faucet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unspent {
    /// Id of the funding transaction, internal order.
    pub tx_id: ChainHash,
    pub vout: u32,
    pub value: i64,
}

/// Result of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastSuccess {
    /// Transaction id reported by the network, display order.
    pub txid: String,
    pub message: String,
}

/// A rejection reported by the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastFailure {
    /// Machine-readable code, e.g. `64`.
    pub code: String,
    /// Reason given by the network, e.g. `non-final`.
    pub description: String,
}

impl BroadcastFailure {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        BroadcastFailure {
            code: code.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for BroadcastFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

impl std::error::Error for BroadcastFailure {}

/// Relays finished transactions to the network.
pub trait Broadcaster {
    /// Broadcast a transaction.
    ///
    /// # Returns
    /// `Ok(BroadcastSuccess)`, or the network's rejection unchanged.
    fn broadcast(&self, tx: &Transaction) -> Result<BroadcastSuccess, BroadcastFailure>;
}

/// Sends coins to an address, typically on a test network.
pub trait Faucet {
    /// Pay `value` to `address`.
    ///
    /// # Returns
    /// The output that now holds the funds.
    fn fund(&self, address: &Address, value: i64) -> Result<Unspent, BroadcastFailure>;
}
