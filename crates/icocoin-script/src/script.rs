//! The `Script` value: raw bytecode with chunk, hex and ASM views.

use std::fmt;

use crate::chunk::{self, read_op, Chunk};
use crate::ScriptError;

/// A script, held as its serialized bytes.
///
/// Construction from chunks always compiles to the minimal encoding; bytes
/// from the wire are kept exactly as received.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    /// An empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Wrap raw bytes without parsing them.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Decode a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Compile chunks into a script.
    pub fn from_chunks(chunks: &[Chunk]) -> Result<Self, ScriptError> {
        Ok(Script(chunk::compile(chunks)?))
    }

    /// Parse space-separated ASM tokens.
    ///
    /// # Arguments
    /// * `asm` - Opcode names and hex payloads, e.g. `OP_DUP OP_HASH160 <hex> ...`.
    ///
    /// # Returns
    /// The compiled script, or `InvalidAsmToken`.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let chunks = asm
            .split_whitespace()
            .map(Chunk::from_asm)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_chunks(&chunks)
    }

    /// Decompile into chunks.
    pub fn chunks(&self) -> Result<Vec<Chunk>, ScriptError> {
        chunk::decompile(&self.0)
    }

    /// Space-separated ASM text.
    pub fn to_asm(&self) -> Result<String, ScriptError> {
        let tokens: Vec<String> = self.chunks()?.iter().map(Chunk::to_asm).collect();
        Ok(tokens.join(" "))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the script contains only push operations.
    pub fn is_push_only(&self) -> bool {
        self.chunks()
            .map(|chunks| chunk::is_push_only(&chunks))
            .unwrap_or(false)
    }

    /// A copy with every occurrence of opcode `op` removed.
    ///
    /// Only opcode positions are matched; bytes inside push payloads are kept,
    /// and the remaining operations keep their original encoding.
    pub fn without_opcode(&self, op: u8) -> Result<Script, ScriptError> {
        let mut out = Vec::with_capacity(self.0.len());
        let mut pos = 0;
        while pos < self.0.len() {
            let raw = read_op(&self.0, pos)?;
            if raw.data.is_some() || raw.op != op {
                out.extend_from_slice(&self.0[raw.start..raw.end]);
            }
            pos = raw.end;
        }
        Ok(Script(out))
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::*;

    const P2PKH_HEX: &str = "76a914805096c5167877a5799977d46fb9dee5891dc3cb88ac";
    const P2PKH_ASM: &str =
        "OP_DUP OP_HASH160 805096c5167877a5799977d46fb9dee5891dc3cb OP_EQUALVERIFY OP_CHECKSIG";

    #[test]
    fn test_asm_roundtrip() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(script.to_asm().unwrap(), P2PKH_ASM);
        assert_eq!(Script::from_asm(P2PKH_ASM).unwrap(), script);
    }

    #[test]
    fn test_asm_empty_push() {
        let script =
            Script::from_chunks(&[Chunk::Op(OP_DUP), Chunk::push(vec![]), Chunk::Op(OP_DROP)])
                .unwrap();
        assert_eq!(script.to_hex(), "760075");
        assert_eq!(script.to_asm().unwrap(), "OP_DUP OP_0 OP_DROP");
        assert_eq!(Script::from_asm("OP_DUP OP_0 OP_DROP").unwrap(), script);
    }

    #[test]
    fn test_empty_script() {
        assert!(Script::from_hex("").unwrap().is_empty());
        assert_eq!(Script::from_asm("").unwrap(), Script::new());
        assert_eq!(Script::new().to_asm().unwrap(), "");
    }

    #[test]
    fn test_from_hex_invalid() {
        assert!(matches!(
            Script::from_hex("zz"),
            Err(ScriptError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_to_asm_truncated() {
        let script = Script::from_hex("76a914805096").unwrap();
        assert!(matches!(
            script.to_asm(),
            Err(ScriptError::TruncatedPush { offset: 2, .. })
        ));
    }

    #[test]
    fn test_without_codeseparator() {
        let inner = Script::from_hex(P2PKH_HEX).unwrap();
        let mut wrapped = vec![OP_CODESEPARATOR];
        wrapped.extend_from_slice(inner.as_bytes());
        wrapped.push(OP_CODESEPARATOR);
        let wrapped = Script::from(wrapped);
        assert_eq!(wrapped.without_opcode(OP_CODESEPARATOR).unwrap(), inner);

        // 0xab inside a payload is data, not an opcode.
        let data = Script::from_hex("02abab").unwrap();
        assert_eq!(data.without_opcode(OP_CODESEPARATOR).unwrap(), data);
    }

    #[test]
    fn test_without_opcode_keeps_non_minimal_pushes() {
        let script = Script::from_hex("4c0105ab").unwrap();
        assert_eq!(
            script.without_opcode(OP_CODESEPARATOR).unwrap().to_hex(),
            "4c0105"
        );
    }

    #[test]
    fn test_push_only() {
        assert!(Script::from_hex("004f0102").unwrap().is_push_only());
        assert!(!Script::from_hex(P2PKH_HEX).unwrap().is_push_only());
        assert!(!Script::from_hex("02aa").unwrap().is_push_only());
    }

    #[test]
    fn test_serde_hex() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, format!("\"{}\"", P2PKH_HEX));
        let back: Script = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
        assert!(serde_json::from_str::<Script>("\"0g\"").is_err());
    }

    #[test]
    fn test_display_and_debug() {
        let script = Script::from_hex(P2PKH_HEX).unwrap();
        assert_eq!(script.to_string(), P2PKH_HEX);
        assert_eq!(format!("{:?}", script), format!("Script({})", P2PKH_HEX));
    }
}
