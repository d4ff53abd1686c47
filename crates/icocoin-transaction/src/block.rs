//! Blocks and block headers.
//!
//! A block is an 80-byte header followed by a count-prefixed transaction
//! list. The block id hashes the header only. An 80-byte buffer with no
//! count is read as a header-only block.

use icocoin_primitives::chainhash::ChainHash;
use icocoin_primitives::util::{VarInt, WireReader, WireWriter};

use crate::transaction::Transaction;
use crate::TransactionError;

/// Serialized size of a block header.
pub const HEADER_SIZE: usize = 80;

/// Block header.
///
/// # Wire format
///
/// | Field        | Size          |
/// |--------------|---------------|
/// | version      | 4 bytes (LE)  |
/// | prev_block   | 32 bytes      |
/// | merkle_root  | 32 bytes      |
/// | timestamp    | 4 bytes (LE)  |
/// | bits         | 4 bytes (LE)  |
/// | nonce        | 4 bytes (LE)  |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: ChainHash,
    pub merkle_root: ChainHash,
    /// Unix time in seconds.
    pub timestamp: u32,
    /// Compact difficulty target.
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Deserialize a header from a `WireReader`.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let header = reader.read_array::<HEADER_SIZE>().map_err(|e| {
            TransactionError::SerializationError(format!("reading block header: {}", e))
        })?;
        // The array is exactly 80 bytes, so the field reads cannot fail.
        let mut fields = WireReader::new(&header);
        Ok(BlockHeader {
            version: fields.read_i32_le()?,
            prev_block: ChainHash::new(fields.read_array()?),
            merkle_root: ChainHash::new(fields.read_array()?),
            timestamp: fields.read_u32_le()?,
            bits: fields.read_u32_le()?,
            nonce: fields.read_u32_le()?,
        })
    }

    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_i32_le(self.version);
        writer.write_bytes(self.prev_block.as_bytes());
        writer.write_bytes(self.merkle_root.as_bytes());
        writer.write_u32_le(self.timestamp);
        writer.write_u32_le(self.bits);
        writer.write_u32_le(self.nonce);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(HEADER_SIZE);
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Double SHA-256 of the 80 header bytes, internal order.
    pub fn hash(&self) -> ChainHash {
        ChainHash::sha256d(&self.to_bytes())
    }
}

/// A block: header plus transactions.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a block from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - A header, optionally followed by a transaction count and
    ///   that many transactions.
    ///
    /// # Returns
    /// `Ok(Block)`, a `SerializationError` for truncated data, or
    /// `TrailingBytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let header = BlockHeader::read_from(&mut reader)?;
        if reader.remaining() == 0 {
            return Ok(Block {
                header,
                transactions: Vec::new(),
            });
        }

        let count = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading transaction count: {}", e))
        })?;
        let count = usize::try_from(count.value()).map_err(|_| {
            TransactionError::SerializationError(format!(
                "transaction count {} is too large",
                count.value()
            ))
        })?;
        let mut transactions = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            transactions.push(Transaction::read_from(&mut reader)?);
        }
        if reader.remaining() != 0 {
            return Err(TransactionError::TrailingBytes(reader.remaining()));
        }
        tracing::debug!(block = %header.hash(), tx_count = count, "parsed block");

        Ok(Block {
            header,
            transactions,
        })
    }

    /// Serialize the block.
    ///
    /// # Arguments
    /// * `header_only` - Emit just the 80 header bytes.
    pub fn to_bytes(&self, header_only: bool) -> Vec<u8> {
        if header_only {
            return self.header.to_bytes();
        }
        let mut writer = WireWriter::with_capacity(
            HEADER_SIZE + 9 + self.transactions.iter().map(Transaction::size).sum::<usize>(),
        );
        self.header.write_to(&mut writer);
        writer.write_varint(VarInt::from(self.transactions.len()));
        for tx in &self.transactions {
            tx.write_to(&mut writer);
        }
        writer.into_bytes()
    }

    pub fn to_hex(&self, header_only: bool) -> String {
        hex::encode(self.to_bytes(header_only))
    }

    /// Block id; independent of the transaction list.
    pub fn id(&self) -> ChainHash {
        self.header.hash()
    }

    /// Block id in display order.
    pub fn id_hex(&self) -> String {
        self.id().to_string()
    }

    /// Merkle root of `transactions`, or `None` for an empty list.
    pub fn calculate_merkle_root(transactions: &[Transaction]) -> Option<ChainHash> {
        let ids: Vec<ChainHash> = transactions.iter().map(Transaction::id).collect();
        merkle_root(&ids)
    }
}

/// Merkle root of a list of hashes in internal order.
///
/// Each level pairs neighbours and hashes their concatenation; an odd hash
/// at the end of a level is paired with itself.
pub fn merkle_root(hashes: &[ChainHash]) -> Option<ChainHash> {
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                let mut concatenated = [0u8; 64];
                concatenated[..32].copy_from_slice(left.as_bytes());
                concatenated[32..].copy_from_slice(right.as_bytes());
                ChainHash::sha256d(&concatenated)
            })
            .collect();
    }
    level.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merkle_root_pairing() {
        let a = ChainHash::sha256d(b"a");
        let b = ChainHash::sha256d(b"b");
        let c = ChainHash::sha256d(b"c");

        assert_eq!(merkle_root(&[]), None);
        assert_eq!(merkle_root(&[a]), Some(a));
        assert_eq!(
            merkle_root(&[a, b]).unwrap().to_string(),
            "f01b8b33d4737f715303d502cd8dda6b2ea4f9513c169d94b18b5f2fa1a367b7"
        );
        assert_eq!(
            merkle_root(&[a, b, c]).unwrap().to_string(),
            "bf0ca48d50405f62cb40fa67c6f9fd9309e9a5fcb2ad05d3976ecb28839b4474"
        );
    }

    #[test]
    fn test_header_roundtrip() {
        let header = BlockHeader {
            version: 2,
            prev_block: ChainHash::new([7; 32]),
            merkle_root: ChainHash::new([9; 32]),
            timestamp: 1_500_000_000,
            bits: 0x1d00ffff,
            nonce: 42,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        let block = Block::from_bytes(&bytes).unwrap();
        assert_eq!(block.header, header);
        assert!(block.transactions.is_empty());
    }

    #[test]
    fn test_truncated_header() {
        let err = Block::from_bytes(&[0u8; 79]).unwrap_err();
        assert!(matches!(err, TransactionError::SerializationError(msg) if msg.contains("block header")));
    }
}
