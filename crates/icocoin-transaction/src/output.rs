//! Transaction output: a value and the script that locks it.

use icocoin_primitives::util::{VarInt, WireReader, WireWriter};
use icocoin_script::Script;

use crate::TransactionError;

/// A single output.
///
/// `value` is signed on the wire. Signature hashing for `SIGHASH_SINGLE`
/// writes `-1` into the outputs it blanks, so the full range is kept.
///
/// # Wire format
///
/// | Field       | Size          |
/// |-------------|---------------|
/// | value       | 8 bytes (LE)  |
/// | script len  | VarInt        |
/// | script      | variable      |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Amount in the smallest currency unit.
    pub value: i64,

    /// Output (locking) script.
    pub script: Script,
}

impl TransactionOutput {
    pub fn new(script: Script, value: i64) -> Self {
        TransactionOutput { value, script }
    }

    /// The placeholder `SIGHASH_SINGLE` substitutes for outputs before the
    /// signed index: value -1 and an empty script.
    pub(crate) fn blank() -> Self {
        TransactionOutput {
            value: -1,
            script: Script::new(),
        }
    }

    /// Deserialize an output from a `WireReader`.
    ///
    /// # Returns
    /// `Ok(TransactionOutput)`, or a `SerializationError` naming the
    /// truncated field.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let value = reader.read_i64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading value: {}", e))
        })?;

        let script = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading output script: {}", e))
        })?;

        Ok(TransactionOutput {
            value,
            script: Script::from_bytes(script),
        })
    }

    /// Serialize this output into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_i64_le(self.value);
        writer.write_varint(VarInt::from(self.script.len()));
        writer.write_bytes(self.script.as_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(9 + self.script.len());
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}
