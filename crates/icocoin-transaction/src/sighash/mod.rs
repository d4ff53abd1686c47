//! Legacy signature hash.
//!
//! The digest a signature commits to is the double SHA-256 of a modified
//! copy of the transaction followed by the 4-byte hash type. The copy is
//! shaped by the hash type:
//!
//! * every input script is emptied and the signed input carries the
//!   subscript, with `OP_CODESEPARATOR` removed;
//! * `NONE` drops all outputs, `SINGLE` keeps outputs up to the signed index
//!   and blanks the earlier ones; both zero the other inputs' sequences;
//! * `ANYONECANPAY` keeps only the signed input.

use icocoin_primitives::hash::sha256d;
use icocoin_primitives::util::WireWriter;
use icocoin_script::opcodes::OP_CODESEPARATOR;
use icocoin_script::Script;

pub use icocoin_primitives::sighash::{
    base_type, is_anyone_can_pay, is_defined, SIGHASH_ALL, SIGHASH_ANYONECANPAY,
    SIGHASH_BASE_MASK, SIGHASH_NONE, SIGHASH_SINGLE,
};

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Compute the legacy signature hash for an input.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `subscript` - Script of the output being spent (the redeem script for
///   pay-to-script-hash).
/// * `hash_type` - Hash type, e.g. `SIGHASH_ALL`.
///
/// # Returns
/// The 32-byte digest in internal byte order, `InputIndexOutOfRange`, or
/// `NoMatchingOutput` when `SINGLE` has no output at `input_index`.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    subscript: &Script,
    hash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, subscript, hash_type)?;
    Ok(sha256d(&preimage))
}

/// The bytes hashed by [`signature_hash`].
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    subscript: &Script,
    hash_type: u32,
) -> Result<Vec<u8>, TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InputIndexOutOfRange {
            index: input_index,
            count: tx.inputs.len(),
        });
    }
    tracing::debug!(input_index, hash_type, "computing legacy signature hash");

    let script_code = subscript.without_opcode(OP_CODESEPARATOR)?;
    let mut copy = tx.clone();

    match base_type(hash_type) {
        SIGHASH_NONE => {
            copy.outputs.clear();
            zero_other_sequences(&mut copy, input_index);
        }
        SIGHASH_SINGLE => {
            if input_index >= copy.outputs.len() {
                return Err(TransactionError::NoMatchingOutput {
                    index: input_index,
                    outputs: copy.outputs.len(),
                });
            }
            copy.outputs.truncate(input_index + 1);
            for output in &mut copy.outputs[..input_index] {
                *output = TransactionOutput::blank();
            }
            zero_other_sequences(&mut copy, input_index);
        }
        _ => {}
    }

    if is_anyone_can_pay(hash_type) {
        let mut input = copy.inputs.swap_remove(input_index);
        input.script = script_code;
        copy.inputs = vec![input];
    } else {
        for input in &mut copy.inputs {
            input.script = Script::new();
        }
        copy.inputs[input_index].script = script_code;
    }

    let mut writer = WireWriter::with_capacity(copy.size() + 4);
    copy.write_to(&mut writer);
    writer.write_u32_le(hash_type);
    Ok(writer.into_bytes())
}

fn zero_other_sequences(tx: &mut Transaction, input_index: usize) {
    for (i, input) in tx.inputs.iter_mut().enumerate() {
        if i != input_index {
            input.sequence = 0;
        }
    }
}
