//! Script chunks and the bytecode compiler/decompiler.
//!
//! A chunk is either a bare opcode or a data push. `compile` always picks the
//! smallest encoding for a push (dedicated small-integer opcodes, then a
//! direct length byte, then OP_PUSHDATA1/2/4). `decompile` accepts every push
//! form and folds payloads with a dedicated opcode back into that opcode, so
//! the two are inverses over canonical scripts.

use crate::opcodes::*;
use crate::ScriptError;

/// One element of a script.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Chunk {
    /// A bare opcode, including OP_0..OP_16 and OP_1NEGATE.
    Op(u8),
    /// A data push, serialized with the smallest prefix that fits.
    Push(Vec<u8>),
}

impl Chunk {
    /// Shorthand for `Chunk::Push(data.into())`.
    pub fn push(data: impl Into<Vec<u8>>) -> Self {
        Chunk::Push(data.into())
    }

    pub fn opcode(&self) -> Option<u8> {
        match self {
            Chunk::Op(op) => Some(*op),
            Chunk::Push(_) => None,
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Chunk::Op(_) => None,
            Chunk::Push(data) => Some(data),
        }
    }

    /// Whether the chunk only pushes a value: any data push, OP_0,
    /// OP_1NEGATE or OP_1..OP_16.
    pub fn is_push(&self) -> bool {
        match self {
            Chunk::Push(_) => true,
            Chunk::Op(op) => *op == OP_0 || *op == OP_1NEGATE || (OP_1..=OP_16).contains(op),
        }
    }

    /// ASM token: hex for data, the opcode name otherwise.
    ///
    /// A payload with a dedicated opcode is spelled as that opcode, so the
    /// empty push reads `OP_0`.
    pub fn to_asm(&self) -> String {
        match self {
            Chunk::Push(data) => match minimal_op(data) {
                Some(op) => Chunk::Op(op).to_asm(),
                None => hex::encode(data),
            },
            Chunk::Op(op) => match opcode_name(*op) {
                Some(name) => name.to_string(),
                None => format!("{}{}", UNKNOWN_PREFIX, op),
            },
        }
    }

    /// Parse one ASM token produced by [`to_asm`](Self::to_asm).
    pub fn from_asm(token: &str) -> Result<Self, ScriptError> {
        if let Some(op) = opcode_from_name(token) {
            return Ok(Chunk::Op(op));
        }
        if let Some(n) = token.strip_prefix(UNKNOWN_PREFIX) {
            return n
                .parse::<u8>()
                .map(Chunk::Op)
                .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()));
        }
        hex::decode(token)
            .map(Chunk::Push)
            .map_err(|_| ScriptError::InvalidAsmToken(token.to_string()))
    }
}

/// ASM spelling of opcodes that have no name.
const UNKNOWN_PREFIX: &str = "OP_UNKNOWN";

/// The dedicated opcode for a payload, if it has one.
///
/// Empty payloads map to OP_0, single bytes 1..=16 to OP_1..OP_16, and the
/// single byte 0x81 (-1) to OP_1NEGATE.
pub fn minimal_op(data: &[u8]) -> Option<u8> {
    match data {
        [] => Some(OP_0),
        [n @ 1..=16] => small_int_op(*n),
        [0x81] => Some(OP_1NEGATE),
        _ => None,
    }
}

/// Length prefix for a generic push of `len` bytes.
fn push_prefix(len: usize) -> Result<Vec<u8>, ScriptError> {
    if len <= OP_DATA_75 as usize {
        Ok(vec![len as u8])
    } else if len <= 0xff {
        Ok(vec![OP_PUSHDATA1, len as u8])
    } else if len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(len as u16).to_le_bytes());
        Ok(buf)
    } else {
        let len32 = u32::try_from(len).map_err(|_| ScriptError::DataTooBig(len))?;
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&len32.to_le_bytes());
        Ok(buf)
    }
}

/// Serialize chunks to script bytes.
///
/// # Arguments
/// * `chunks` - The chunks in script order.
///
/// # Returns
/// The bytecode, or `DataTooBig` for a payload over 4 GiB.
pub fn compile(chunks: &[Chunk]) -> Result<Vec<u8>, ScriptError> {
    let mut out = Vec::new();
    for chunk in chunks {
        match chunk {
            Chunk::Op(op) => out.push(*op),
            Chunk::Push(data) => match minimal_op(data) {
                Some(op) => out.push(op),
                None => {
                    out.extend_from_slice(&push_prefix(data.len())?);
                    out.extend_from_slice(data);
                }
            },
        }
    }
    Ok(out)
}

/// Parse script bytes into chunks.
///
/// # Arguments
/// * `bytes` - The script bytecode.
///
/// # Returns
/// The chunks, or `TruncatedPush` if a length prefix or payload runs past
/// the end of the script.
pub fn decompile(bytes: &[u8]) -> Result<Vec<Chunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let raw = read_op(bytes, pos)?;
        pos = raw.end;
        let chunk = match raw.data {
            Some(data) => match minimal_op(data) {
                Some(op) => Chunk::Op(op),
                None => Chunk::Push(data.to_vec()),
            },
            None => Chunk::Op(raw.op),
        };
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Whether every chunk is a push.
pub fn is_push_only(chunks: &[Chunk]) -> bool {
    chunks.iter().all(Chunk::is_push)
}

/// One operation as it appears on the wire.
pub(crate) struct RawOp<'a> {
    pub op: u8,
    /// Payload for push opcodes 0x01..=OP_PUSHDATA4.
    pub data: Option<&'a [u8]>,
    pub start: usize,
    pub end: usize,
}

/// Read the operation starting at `pos`.
pub(crate) fn read_op(bytes: &[u8], pos: usize) -> Result<RawOp<'_>, ScriptError> {
    let op = bytes[pos];
    let (len_size, len) = match op {
        0x01..=OP_DATA_75 => (0, op as usize),
        OP_PUSHDATA1 => (1, read_len(bytes, pos, 1)?),
        OP_PUSHDATA2 => (2, read_len(bytes, pos, 2)?),
        OP_PUSHDATA4 => (4, read_len(bytes, pos, 4)?),
        _ => {
            return Ok(RawOp {
                op,
                data: None,
                start: pos,
                end: pos + 1,
            })
        }
    };
    let data_start = pos + 1 + len_size;
    let available = bytes.len() - data_start;
    if len > available {
        return Err(ScriptError::TruncatedPush {
            offset: pos,
            needed: len,
            available,
        });
    }
    Ok(RawOp {
        op,
        data: Some(&bytes[data_start..data_start + len]),
        start: pos,
        end: data_start + len,
    })
}

/// Read a little-endian length field of `size` bytes following the opcode at `pos`.
fn read_len(bytes: &[u8], pos: usize, size: usize) -> Result<usize, ScriptError> {
    let field = bytes.get(pos + 1..pos + 1 + size).ok_or(ScriptError::TruncatedPush {
        offset: pos,
        needed: size,
        available: bytes.len() - pos - 1,
    })?;
    Ok(field
        .iter()
        .rev()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize))
}
