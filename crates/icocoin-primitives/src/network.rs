//! Network parameters.
//!
//! A `Network` carries the version bytes that tag addresses, WIF keys and
//! extended keys for one chain. It is a plain `Copy` value passed to every
//! function that needs it; there is no default network.

use serde::{Deserialize, Serialize};

/// Version bytes for serialized extended keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bip32Versions {
    /// Prefix of an extended public key.
    pub public: u32,
    /// Prefix of an extended private key.
    pub private: u32,
}

/// Version bytes identifying one network.
///
/// Custom networks can be described in JSON:
///
/// ```
/// use icocoin_primitives::network::Network;
///
/// let json = r#"{
///     "bip32": { "public": 70617039, "private": 70615956 },
///     "pub_key_hash": 111,
///     "script_hash": 196,
///     "wif": 239
/// }"#;
/// let net: Network = serde_json::from_str(json).unwrap();
/// assert_eq!(net, Network::TESTNET);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network {
    /// Extended key prefixes.
    pub bip32: Bip32Versions,
    /// Version byte of pay-to-public-key-hash addresses.
    pub pub_key_hash: u8,
    /// Version byte of pay-to-script-hash addresses.
    pub script_hash: u8,
    /// Version byte of WIF private keys.
    pub wif: u8,
}

impl Network {
    /// The main icocoin network.
    pub const ICOCOIN: Network = Network {
        bip32: Bip32Versions {
            public: 0x0488_b21e,
            private: 0x0488_ade4,
        },
        pub_key_hash: 0x00,
        script_hash: 0x05,
        wif: 0x80,
    };

    /// The public test network.
    pub const TESTNET: Network = Network {
        bip32: Bip32Versions {
            public: 0x0435_87cf,
            private: 0x0435_8394,
        },
        pub_key_hash: 0x6f,
        script_hash: 0xc4,
        wif: 0xef,
    };

    /// Whether `version` is an address version byte of this network.
    pub fn is_address_version(&self, version: u8) -> bool {
        version == self.pub_key_hash || version == self.script_hash
    }
}
