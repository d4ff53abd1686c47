//! Base58Check addresses.
//!
//! An address is a version byte and a 20-byte hash. The version byte says
//! which network it belongs to and whether the hash is of a public key or a
//! script; `Network` supplies the byte for each kind.

use std::fmt;
use std::str::FromStr;

use icocoin_primitives::base58;
use icocoin_primitives::network::Network;

use crate::templates::{pubkey_hash, script_hash};
use crate::{Script, ScriptError};

/// Length of the hash carried by an address.
pub const ADDRESS_HASH_LEN: usize = 20;

/// A decoded address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    pub version: u8,
    pub hash: [u8; ADDRESS_HASH_LEN],
}

impl Address {
    /// Pay-to-public-key-hash address on `network`.
    pub fn p2pkh(hash: [u8; ADDRESS_HASH_LEN], network: &Network) -> Self {
        Address {
            version: network.pub_key_hash,
            hash,
        }
    }

    /// Pay-to-script-hash address on `network`.
    pub fn p2sh(hash: [u8; ADDRESS_HASH_LEN], network: &Network) -> Self {
        Address {
            version: network.script_hash,
            hash,
        }
    }

    /// Decode any Base58Check address without checking its version.
    ///
    /// # Arguments
    /// * `s` - The address string.
    ///
    /// # Returns
    /// The address, `InvalidAddressLength` if the payload is not 20 bytes,
    /// or the underlying Base58Check error.
    pub fn from_base58check(s: &str) -> Result<Self, ScriptError> {
        let (version, payload) = base58::check_decode(s)?;
        let hash: [u8; ADDRESS_HASH_LEN] = payload.as_slice().try_into().map_err(|_| {
            tracing::debug!(address = s, len = payload.len(), "address payload has wrong length");
            ScriptError::InvalidAddressLength(payload.len())
        })?;
        Ok(Address { version, hash })
    }

    /// Decode an address whose version belongs to one of `networks`.
    ///
    /// # Returns
    /// The address, or `UnknownAddressVersion` if no network claims its
    /// version byte.
    pub fn from_base58check_for(s: &str, networks: &[Network]) -> Result<Self, ScriptError> {
        let address = Self::from_base58check(s)?;
        if !networks.iter().any(|n| n.is_address_version(address.version)) {
            tracing::debug!(address = s, version = address.version, "address version not allowed");
            return Err(ScriptError::UnknownAddressVersion(address.version));
        }
        Ok(address)
    }

    pub fn to_base58check(&self) -> String {
        base58::check_encode(self.version, &self.hash)
    }

    /// Address paid by a standard output script.
    ///
    /// # Returns
    /// The address, or `NoMatchingTemplate` if the script is neither
    /// pay-to-public-key-hash nor pay-to-script-hash.
    pub fn from_output_script(script: &Script, network: &Network) -> Result<Self, ScriptError> {
        if let Some(hash) = pubkey_hash::output::decode(script) {
            return Ok(Self::p2pkh(hash, network));
        }
        if let Some(hash) = script_hash::output::decode(script) {
            return Ok(Self::p2sh(hash, network));
        }
        Err(ScriptError::NoMatchingTemplate(script.to_hex()))
    }

    /// Output script paying to this address.
    ///
    /// # Returns
    /// The script, or `UnknownAddressVersion` if the version is neither of
    /// `network`'s address versions.
    pub fn to_output_script(&self, network: &Network) -> Result<Script, ScriptError> {
        if self.version == network.pub_key_hash {
            Ok(pubkey_hash::output::encode(&self.hash))
        } else if self.version == network.script_hash {
            Ok(script_hash::output::encode(&self.hash))
        } else {
            Err(ScriptError::UnknownAddressVersion(self.version))
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58check())
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_base58check(s)
    }
}
