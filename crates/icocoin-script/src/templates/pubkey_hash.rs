//! Pay-to-public-key-hash.
//!
//! Output: `OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG`.
//! Input: `<script signature> <public key>`.

pub mod output {
    use crate::opcodes::*;
    use crate::Script;

    /// Locking script paying to `hash`.
    pub fn encode(hash: &[u8; 20]) -> Script {
        let mut bytes = Vec::with_capacity(25);
        bytes.extend_from_slice(&[OP_DUP, OP_HASH160, 20]);
        bytes.extend_from_slice(hash);
        bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script::from(bytes)
    }

    /// The public-key hash, if `script` has exactly this shape.
    ///
    /// The match is on bytes, so a hash pushed with a longer prefix is not
    /// recognized.
    pub fn decode(script: &Script) -> Option<[u8; 20]> {
        match script.as_bytes() {
            [OP_DUP, OP_HASH160, 20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] if hash.len() == 20 => {
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
    use icocoin_primitives::ec::public_key::is_canonical_encoding;
    use icocoin_primitives::ec::Signature;
    use icocoin_primitives::PrimitivesError;

    use crate::chunk::Chunk;
    use crate::{Script, ScriptError};

    /// Unlocking script from a script signature and a serialized public key.
    ///
    /// # Returns
    /// The script, or an error if the signature is not a valid script
    /// signature or the key is not a standard SEC1 encoding.
    pub fn encode(signature: &[u8], pub_key: &[u8]) -> Result<Script, ScriptError> {
        Signature::parse_script_signature(signature)?;
        if !is_canonical_encoding(pub_key) {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "unsupported encoding of {} bytes",
                pub_key.len()
            ))
            .into());
        }
        Script::from_chunks(&[Chunk::push(signature), Chunk::push(pub_key)])
    }

    /// Split into `(script signature, public key)`.
    pub fn decode(script: &Script) -> Option<(Vec<u8>, Vec<u8>)> {
        let chunks = script.chunks().ok()?;
        match chunks.as_slice() {
            [Chunk::Push(sig), Chunk::Push(key)]
                if Signature::parse_script_signature(sig).is_ok() && is_canonical_encoding(key) =>
            {
                Some((sig.clone(), key.clone()))
            }
            _ => None,
        }
    }

    pub fn check(script: &Script) -> bool {
        decode(script).is_some()
    }
}
