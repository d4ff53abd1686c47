//! Transaction input referencing a previous output.
//!
//! The previous transaction hash is kept in internal byte order, the order
//! it takes on the wire. Block explorers print it reversed; use
//! [`TransactionInput::prev_tx_id_hex`] for that form.

use icocoin_primitives::chainhash::ChainHash;
use icocoin_primitives::util::{VarInt, WireReader, WireWriter};
use icocoin_script::Script;

use crate::TransactionError;

/// Sequence number of a final input (no relative lock time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Output index used by a coinbase input.
pub const COINBASE_INDEX: u32 = 0xFFFF_FFFF;

/// A single input.
///
/// # Wire format
///
/// | Field        | Size          |
/// |--------------|---------------|
/// | prev_hash    | 32 bytes      |
/// | prev_index   | 4 bytes (LE)  |
/// | script len   | VarInt        |
/// | script       | variable      |
/// | sequence     | 4 bytes (LE)  |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Hash of the transaction being spent, internal order.
    pub prev_hash: ChainHash,

    /// Index of the output within that transaction.
    pub prev_index: u32,

    /// Signature script; empty until signed.
    pub script: Script,

    pub sequence: u32,
}

impl TransactionInput {
    /// Create an unsigned input spending `prev_hash:prev_index`.
    pub fn new(prev_hash: ChainHash, prev_index: u32, sequence: u32) -> Self {
        TransactionInput {
            prev_hash,
            prev_index,
            script: Script::new(),
            sequence,
        }
    }

    /// Deserialize an input from a `WireReader`.
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// `Ok(TransactionInput)`, or a `SerializationError` naming the field
    /// that was truncated.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let prev_hash = reader.read_array::<32>().map_err(|e| {
            TransactionError::SerializationError(format!("reading previous tx hash: {}", e))
        })?;

        let prev_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;

        let script = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading input script: {}", e))
        })?;

        let sequence = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence: {}", e))
        })?;

        Ok(TransactionInput {
            prev_hash: ChainHash::new(prev_hash),
            prev_index,
            script: Script::from_bytes(script),
            sequence,
        })
    }

    /// Serialize this input into a `WireWriter`.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_bytes(self.prev_hash.as_bytes());
        writer.write_u32_le(self.prev_index);
        writer.write_varint(VarInt::from(self.script.len()));
        writer.write_bytes(self.script.as_bytes());
        writer.write_u32_le(self.sequence);
    }

    /// Id of the spent transaction in display (reversed) order.
    pub fn prev_tx_id_hex(&self) -> String {
        self.prev_hash.to_string()
    }

    /// Whether this input spends the null prevout used by coinbase inputs.
    pub fn is_null_prevout(&self) -> bool {
        self.prev_hash == ChainHash::default() && self.prev_index == COINBASE_INDEX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT_HEX: &str = "a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0\
        010000006a\
        47304402204e1f2d3ca4d0e24d6b7b1d4c9b5b6f1bfe7c4e0b1f1a0f5e1c9b1b0e0f2d3c4b02201c2e3f4a5b6c7d8e9fa0b1c2d3e4f5a6b7c8d9eaf0b1c2d3e4f5a6b7c8d9eaf001\
        21038ea27103fb646a2cea9eca9080737e0b23640caaaef2853416c9b286b353313e\
        feffffff";

    #[test]
    fn test_read_write_roundtrip() {
        let bytes = hex::decode(INPUT_HEX).unwrap();
        let mut reader = WireReader::new(&bytes);
        let input = TransactionInput::read_from(&mut reader).unwrap();
        assert_eq!(reader.remaining(), 0);

        assert_eq!(input.prev_index, 1);
        assert_eq!(input.sequence, 0xffff_fffe);
        assert_eq!(input.script.len(), 0x6a);
        assert_eq!(
            input.prev_tx_id_hex(),
            "a0f39f414a691e570fff199d0a350c864d71237b13fb0093d9546adc7f45bca9"
        );

        let mut writer = WireWriter::new();
        input.write_to(&mut writer);
        assert_eq!(hex::encode(writer.into_bytes()), INPUT_HEX);
    }

    #[test]
    fn test_empty_script() {
        let input = TransactionInput::new(ChainHash::default(), 3, DEFAULT_SEQUENCE_NUMBER);
        let mut writer = WireWriter::new();
        input.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 32 + 4 + 1 + 4);

        let back = TransactionInput::read_from(&mut WireReader::new(&bytes)).unwrap();
        assert_eq!(back, input);
        assert!(back.script.is_empty());
    }

    #[test]
    fn test_truncated_fields() {
        let bytes = hex::decode(INPUT_HEX).unwrap();
        for (cut, field) in [
            (10, "previous tx hash"),
            (34, "output index"),
            (40, "input script"),
            (bytes.len() - 2, "sequence"),
        ] {
            let err = TransactionInput::read_from(&mut WireReader::new(&bytes[..cut])).unwrap_err();
            match err {
                TransactionError::SerializationError(msg) => {
                    assert!(msg.contains(field), "{} should mention {}", msg, field)
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_null_prevout() {
        let coinbase = TransactionInput::new(ChainHash::default(), COINBASE_INDEX, 0);
        assert!(coinbase.is_null_prevout());
        let spend = TransactionInput::new(ChainHash::default(), 0, 0);
        assert!(!spend.is_null_prevout());
    }
}
