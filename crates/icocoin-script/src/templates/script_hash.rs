//! Pay-to-script-hash.
//!
//! Output: `OP_HASH160 <20-byte hash> OP_EQUAL`.
//! Input: `<push-only arguments...> <serialized redeem script>`.

pub mod output {
    use icocoin_primitives::hash::hash160;

    use crate::opcodes::*;
    use crate::Script;

    /// Locking script paying to the script whose Hash160 is `hash`.
    pub fn encode(hash: &[u8; 20]) -> Script {
        let mut bytes = Vec::with_capacity(23);
        bytes.extend_from_slice(&[OP_HASH160, 20]);
        bytes.extend_from_slice(hash);
        bytes.push(OP_EQUAL);
        Script::from(bytes)
    }

    /// Locking script paying to `redeem_script`.
    pub fn for_redeem_script(redeem_script: &Script) -> Script {
        encode(&hash160(redeem_script.as_bytes()))
    }

    /// The script hash, if `script` has exactly this shape.
    pub fn decode(script: &Script) -> Option<[u8; 20]> {
        match script.as_bytes() {
            [OP_HASH160, 20, hash @ .., OP_EQUAL] if hash.len() == 20 => {
                let mut out = [0u8; 20];
                out.copy_from_slice(hash);
                Some(out)
            }
            _ => None,
        }
    }

    pub fn check(script: &Script) -> bool {
        decode(script).is_some()
    }
}

pub mod input {
    use crate::chunk::{self, Chunk};
    use crate::{Script, ScriptError};

    /// Unlocking script: the redeem script's arguments followed by the
    /// redeem script itself as one push.
    pub fn encode(arguments: &[Chunk], redeem_script: &Script) -> Result<Script, ScriptError> {
        let mut chunks = arguments.to_vec();
        chunks.push(Chunk::push(redeem_script.as_bytes()));
        Script::from_chunks(&chunks)
    }

    /// Split into `(arguments, redeem script)`.
    ///
    /// The last chunk must be a push that decompiles to a non-empty script,
    /// and every chunk before it must be a push.
    pub fn decode(script: &Script) -> Option<(Vec<Chunk>, Script)> {
        let mut chunks = script.chunks().ok()?;
        let redeem = match chunks.pop()? {
            Chunk::Push(bytes) => Script::from(bytes),
            Chunk::Op(_) => return None,
        };
        let redeem_chunks = redeem.chunks().ok()?;
        if redeem_chunks.is_empty() || !chunk::is_push_only(&chunks) {
            return None;
        }
        Some((chunks, redeem))
    }

    pub fn check(script: &Script) -> bool {
        decode(script).is_some()
    }
}
