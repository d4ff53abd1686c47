//! Core transaction type.
//!
//! A transaction is a version, inputs, outputs and a lock time. It supports
//! binary and hex serialization, id computation, coinbase detection and the
//! legacy signature hash.

use std::fmt;

use icocoin_primitives::chainhash::ChainHash;
use icocoin_primitives::util::{VarInt, WireReader, WireWriter};
use icocoin_script::Script;

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::TransactionError;

/// A transaction.
///
/// # Wire format
///
/// | Field        | Size                 |
/// |--------------|----------------------|
/// | version      | 4 bytes (LE, signed) |
/// | input count  | VarInt               |
/// | inputs       | variable             |
/// | output count | VarInt               |
/// | outputs      | variable             |
/// | lock_time    | 4 bytes (LE)         |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,

    pub inputs: Vec<TransactionInput>,

    pub outputs: Vec<TransactionOutput>,

    /// Block height (below 500 000 000) or Unix time before which the
    /// transaction is not final.
    pub lock_time: u32,
}

impl Transaction {
    /// Create an empty version 1 transaction with lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Exactly one serialized transaction.
    ///
    /// # Returns
    /// `Ok(Transaction)`, a `SerializationError` if the data is truncated,
    /// or `TrailingBytes` if anything follows the lock time.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::TrailingBytes(reader.remaining()));
        }
        Ok(tx)
    }

    /// Deserialize a transaction from a `WireReader`, leaving the reader
    /// positioned after the lock time.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let version = reader.read_i32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let input_count = read_count(reader, "input count")?;
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output count")?;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Serialize this transaction into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_i32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(writer);
        }

        writer.write_u32_le(self.lock_time);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(self.size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Serialized length in bytes, computed without serializing.
    pub fn size(&self) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|i| 32 + 4 + VarInt::from(i.script.len()).length() + i.script.len() + 4)
            .sum();
        let outputs: usize = self
            .outputs
            .iter()
            .map(|o| 8 + VarInt::from(o.script.len()).length() + o.script.len())
            .sum();
        4 + VarInt::from(self.inputs.len()).length()
            + inputs
            + VarInt::from(self.outputs.len()).length()
            + outputs
            + 4
    }

    // -----------------------------------------------------------------
    // Transaction ID
    // -----------------------------------------------------------------

    /// Double SHA-256 of the serialized transaction, internal order.
    ///
    /// `Display` on the returned hash gives the conventional reversed id.
    pub fn id(&self) -> ChainHash {
        ChainHash::sha256d(&self.to_bytes())
    }

    /// The transaction id in display order.
    pub fn id_hex(&self) -> String {
        self.id().to_string()
    }

    // -----------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------

    /// Append an input and return its index.
    pub fn add_input(&mut self, input: TransactionInput) -> usize {
        self.inputs.push(input);
        self.inputs.len() - 1
    }

    /// Append an output and return its index.
    pub fn add_output(&mut self, output: TransactionOutput) -> usize {
        self.outputs.push(output);
        self.outputs.len() - 1
    }

    /// Replace the signature script of input `index`.
    pub fn set_input_script(&mut self, index: usize, script: Script) -> Result<(), TransactionError> {
        let count = self.inputs.len();
        let input = self
            .inputs
            .get_mut(index)
            .ok_or(TransactionError::InputIndexOutOfRange { index, count })?;
        input.script = script;
        Ok(())
    }

    /// Whether this is a coinbase transaction: a single input spending the
    /// null prevout (all-zero hash, index `0xFFFFFFFF`).
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].is_null_prevout()
    }

    // -----------------------------------------------------------------
    // Signature hash
    // -----------------------------------------------------------------

    /// Legacy signature hash of input `input_index`.
    ///
    /// # Arguments
    /// * `input_index` - Index of the input being signed.
    /// * `subscript` - Script of the spent output, or the redeem script.
    /// * `hash_type` - e.g. `SIGHASH_ALL`.
    ///
    /// # Returns
    /// The 32-byte digest in internal byte order.
    pub fn hash_for_signature(
        &self,
        input_index: usize,
        subscript: &Script,
        hash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        sighash::signature_hash(self, input_index, subscript, hash_type)
    }
}

fn read_count(reader: &mut WireReader, field: &str) -> Result<usize, TransactionError> {
    let count = reader
        .read_varint()
        .map_err(|e| TransactionError::SerializationError(format!("reading {}: {}", field, e)))?;
    usize::try_from(count.value()).map_err(|_| {
        TransactionError::SerializationError(format!("{} {} is too large", field, count.value()))
    })
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Transaction {
    /// The hex serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
