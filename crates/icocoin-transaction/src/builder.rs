//! Staged transaction construction and signing.
//!
//! A `TransactionBuilder` accumulates inputs and outputs, signs
//! pay-to-public-key-hash inputs (directly or wrapped in
//! pay-to-script-hash), and hands out finished `Transaction` values. Once a
//! signature commits to part of the transaction, that part is frozen.

use std::collections::HashSet;

use icocoin_primitives::chainhash::ChainHash;
use icocoin_primitives::ec::public_key::is_canonical_encoding;
use icocoin_primitives::ec::{KeyPair, Signature};
use icocoin_primitives::hash::hash160;
use icocoin_primitives::network::Network;
use icocoin_script::templates::{pubkey_hash, script_hash};
use icocoin_script::{Address, Chunk, Script};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash::{base_type, is_anyone_can_pay, SIGHASH_NONE, SIGHASH_SINGLE};
use crate::transaction::Transaction;
use crate::TransactionError;

/// What the builder knows about one input.
#[derive(Clone, Debug, Default)]
struct InputState {
    /// Script of the output being spent, if known.
    prev_out_script: Option<Script>,

    redeem_script: Option<Script>,

    /// Hash type of the signature placed in the input, once signed.
    hash_type: Option<u32>,
}

/// Mutable staging area for a transaction.
///
/// Not meant to be shared between threads; each call mutates the builder in
/// place and `build` hands back an independent copy.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    network: Network,
    tx: Transaction,
    inputs: Vec<InputState>,
    prevouts: HashSet<(ChainHash, u32)>,
}

impl TransactionBuilder {
    /// Start an empty version 1 transaction for `network`.
    pub fn new(network: Network) -> Self {
        TransactionBuilder {
            network,
            tx: Transaction::new(),
            inputs: Vec::new(),
            prevouts: HashSet::new(),
        }
    }

    /// Resume building from an existing, possibly partly signed transaction.
    ///
    /// Signed inputs are recognized when they carry a pay-to-public-key-hash
    /// signature script, bare or wrapped in pay-to-script-hash; their hash
    /// types are recovered so the freeze rules keep holding.
    ///
    /// # Returns
    /// The builder, `DuplicateInput`, or `UnsupportedScript` for a non-empty
    /// input script of any other shape.
    pub fn from_transaction(tx: &Transaction, network: Network) -> Result<Self, TransactionError> {
        let mut builder = TransactionBuilder::new(network);
        builder.tx.version = tx.version;
        builder.tx.lock_time = tx.lock_time;
        builder.tx.outputs = tx.outputs.clone();

        for input in &tx.inputs {
            builder.insert_input(input.clone(), None)?;
        }
        for (vin, input) in tx.inputs.iter().enumerate() {
            if !input.script.is_empty() {
                builder.inputs[vin] = recover_input_state(&input.script)?;
            }
        }
        Ok(builder)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Set the transaction version.
    ///
    /// # Returns
    /// `Ok(())`, or `LockTimeFrozen` once any input is signed, since every
    /// signature commits to the version.
    pub fn set_version(&mut self, version: i32) -> Result<(), TransactionError> {
        if self.has_signatures() {
            return Err(TransactionError::LockTimeFrozen);
        }
        self.tx.version = version;
        Ok(())
    }

    /// Set the lock time.
    ///
    /// # Returns
    /// `Ok(())`, or `LockTimeFrozen` once any input is signed.
    pub fn set_lock_time(&mut self, lock_time: u32) -> Result<(), TransactionError> {
        if self.has_signatures() {
            return Err(TransactionError::LockTimeFrozen);
        }
        self.tx.lock_time = lock_time;
        Ok(())
    }

    /// Add an input spending `prev_tx:vout`.
    ///
    /// # Arguments
    /// * `prev_tx` - Hash of the transaction being spent, internal order.
    /// * `vout` - Output index within that transaction.
    /// * `sequence` - Input sequence number.
    /// * `prev_out_script` - Script of the spent output, if known. Signing
    ///   checks keys and redeem scripts against it.
    ///
    /// # Returns
    /// The new input's index, `InputsFrozen`, or `DuplicateInput`.
    pub fn add_input(
        &mut self,
        prev_tx: ChainHash,
        vout: u32,
        sequence: u32,
        prev_out_script: Option<Script>,
    ) -> Result<usize, TransactionError> {
        if !self.can_modify_inputs() {
            return Err(TransactionError::InputsFrozen);
        }
        self.insert_input(TransactionInput::new(prev_tx, vout, sequence), prev_out_script)
    }

    /// Add an input spending output `vout` of `prev_tx`, taking the spent
    /// script from the transaction itself.
    pub fn add_input_from_tx(
        &mut self,
        prev_tx: &Transaction,
        vout: u32,
        sequence: u32,
    ) -> Result<usize, TransactionError> {
        let prev_out_script = prev_tx
            .outputs
            .get(vout as usize)
            .map(|output| output.script.clone());
        self.add_input(prev_tx.id(), vout, sequence, prev_out_script)
    }

    fn insert_input(
        &mut self,
        input: TransactionInput,
        prev_out_script: Option<Script>,
    ) -> Result<usize, TransactionError> {
        if !self.prevouts.insert((input.prev_hash, input.prev_index)) {
            return Err(TransactionError::DuplicateInput {
                txid: input.prev_tx_id_hex(),
                vout: input.prev_index,
            });
        }
        tracing::debug!(txid = %input.prev_hash, vout = input.prev_index, "input added");
        self.inputs.push(InputState {
            prev_out_script,
            ..InputState::default()
        });
        Ok(self.tx.add_input(input))
    }

    /// Add an output paying `value` to `script`.
    ///
    /// # Returns
    /// The new output's index, or `OutputsFrozen` if an existing signature
    /// commits to the output set.
    pub fn add_output(&mut self, script: Script, value: i64) -> Result<usize, TransactionError> {
        if !self.can_modify_outputs() {
            return Err(TransactionError::OutputsFrozen);
        }
        tracing::debug!(script = %script, value, "output added");
        Ok(self.tx.add_output(TransactionOutput::new(script, value)))
    }

    /// Add an output paying `value` to `address`.
    ///
    /// # Returns
    /// The new output's index, `UnknownAddressVersion` if the address is not
    /// on the builder's network, or `OutputsFrozen`.
    pub fn add_output_address(
        &mut self,
        address: &Address,
        value: i64,
    ) -> Result<usize, TransactionError> {
        let script = address.to_output_script(&self.network)?;
        self.add_output(script, value)
    }

    /// Sign input `vin` with `key_pair`.
    ///
    /// The input must be pay-to-public-key-hash, either directly or through
    /// `redeem_script`. With no known previous output script and no redeem
    /// script, the input is assumed to pay the key's own hash.
    ///
    /// # Arguments
    /// * `vin` - Index of the input to sign.
    /// * `key_pair` - A key pair holding a private key.
    /// * `redeem_script` - The redeem script for a pay-to-script-hash input.
    /// * `hash_type` - Signature hash type, e.g. `SIGHASH_ALL`.
    ///
    /// # Returns
    /// `Ok(())` with the input's script set, or the first rule the request
    /// breaks.
    pub fn sign(
        &mut self,
        vin: usize,
        key_pair: &KeyPair,
        redeem_script: Option<&Script>,
        hash_type: u32,
    ) -> Result<(), TransactionError> {
        let count = self.inputs.len();
        let state = self
            .inputs
            .get(vin)
            .ok_or(TransactionError::InputIndexOutOfRange { index: vin, count })?;
        if key_pair.network() != &self.network {
            return Err(TransactionError::NetworkMismatch);
        }
        if state.hash_type.is_some() {
            return Err(TransactionError::AlreadySigned(vin));
        }

        let pub_key_hash = key_pair.pub_key_hash();
        let (subscript, prev_out_script) = match redeem_script {
            Some(redeem) => {
                let expected = script_hash::output::for_redeem_script(redeem);
                if state.prev_out_script.as_ref().is_some_and(|prev| *prev != expected) {
                    return Err(TransactionError::RedeemScriptMismatch);
                }
                (redeem.clone(), expected)
            }
            None => match &state.prev_out_script {
                Some(prev) if script_hash::output::check(prev) => {
                    return Err(TransactionError::MissingRedeemScript(vin));
                }
                Some(prev) => (prev.clone(), prev.clone()),
                None => {
                    let own = pubkey_hash::output::encode(&pub_key_hash);
                    (own.clone(), own)
                }
            },
        };

        match pubkey_hash::output::decode(&subscript) {
            Some(hash) if hash == pub_key_hash => {}
            Some(_) => return Err(TransactionError::PubKeyHashMismatch),
            None => return Err(TransactionError::UnsupportedScript(subscript.to_hex())),
        }

        let digest = self.tx.hash_for_signature(vin, &subscript, hash_type)?;
        let signature = key_pair.sign(&digest)?.to_script_signature(hash_type)?;
        let p2pkh_input = pubkey_hash::input::encode(&signature, &key_pair.public_key_bytes())?;
        let script = match redeem_script {
            Some(redeem) => script_hash::input::encode(&p2pkh_input.chunks()?, redeem)?,
            None => p2pkh_input,
        };

        self.tx.set_input_script(vin, script)?;
        self.inputs[vin] = InputState {
            prev_out_script: Some(prev_out_script),
            redeem_script: redeem_script.cloned(),
            hash_type: Some(hash_type),
        };
        tracing::debug!(vin, hash_type, p2sh = redeem_script.is_some(), "input signed");
        Ok(())
    }

    /// Finish a fully signed transaction.
    ///
    /// # Returns
    /// A copy of the transaction, or `NoInputs`, `NoOutputs` or
    /// `UnsignedInput`.
    pub fn build(&self) -> Result<Transaction, TransactionError> {
        if self.tx.inputs.is_empty() {
            return Err(TransactionError::NoInputs);
        }
        if self.tx.outputs.is_empty() {
            return Err(TransactionError::NoOutputs);
        }
        if let Some(vin) = self.inputs.iter().position(|s| s.hash_type.is_none()) {
            return Err(TransactionError::UnsignedInput(vin));
        }
        Ok(self.tx.clone())
    }

    /// A copy of the transaction as it stands, signed or not.
    pub fn build_incomplete(&self) -> Transaction {
        self.tx.clone()
    }

    /// The redeem script recorded for input `vin`, if any.
    pub fn redeem_script(&self, vin: usize) -> Option<&Script> {
        self.inputs.get(vin)?.redeem_script.as_ref()
    }

    /// The previous output script recorded for input `vin`, if any.
    pub fn prev_out_script(&self, vin: usize) -> Option<&Script> {
        self.inputs.get(vin)?.prev_out_script.as_ref()
    }

    fn has_signatures(&self) -> bool {
        self.inputs.iter().any(|s| s.hash_type.is_some())
    }

    /// Inputs stay open while every signature is `ANYONECANPAY`.
    fn can_modify_inputs(&self) -> bool {
        self.inputs
            .iter()
            .filter_map(|s| s.hash_type)
            .all(is_anyone_can_pay)
    }

    /// `NONE` never commits to outputs; `SINGLE` only to the output at its
    /// own index, which stays valid while inputs do not outnumber outputs.
    fn can_modify_outputs(&self) -> bool {
        let n_inputs = self.tx.inputs.len();
        let n_outputs = self.tx.outputs.len();
        self.inputs
            .iter()
            .filter_map(|s| s.hash_type)
            .all(|hash_type| match base_type(hash_type) {
                SIGHASH_NONE => true,
                SIGHASH_SINGLE => n_inputs <= n_outputs,
                _ => false,
            })
    }
}

/// Rebuild what the builder records for an already signed input.
fn recover_input_state(script: &Script) -> Result<InputState, TransactionError> {
    let unsupported = || TransactionError::UnsupportedScript(script.to_hex());

    let (p2pkh_input, redeem_script) = match script_hash::input::decode(script) {
        Some((arguments, redeem)) if pubkey_hash::output::check(&redeem) => {
            (Script::from_chunks(&arguments)?, Some(redeem))
        }
        _ => (script.clone(), None),
    };
    // Checked by shape first so a malformed signature surfaces its own error.
    let chunks = p2pkh_input.chunks()?;
    let (signature, pub_key) = match chunks.as_slice() {
        [Chunk::Push(sig), Chunk::Push(key)] => (sig, key),
        _ => return Err(unsupported()),
    };
    let parsed = Signature::parse_script_signature(signature)?;
    if !is_canonical_encoding(pub_key) {
        return Err(unsupported());
    }

    let prev_out_script = match &redeem_script {
        Some(redeem) => script_hash::output::for_redeem_script(redeem),
        None => pubkey_hash::output::encode(&hash160(pub_key)),
    };
    Ok(InputState {
        prev_out_script: Some(prev_out_script),
        redeem_script,
        hash_type: Some(parsed.hash_type),
    })
}
