//! Standard script templates.
//!
//! Each template module exposes `output` and `input` submodules with
//! `encode`, `decode` and `check`. `decode` returns `None` when a script
//! does not have the template's shape, so callers can try templates in turn.

use std::fmt;

use crate::Script;

pub mod pubkey_hash;
pub mod script_hash;

/// The template an output script follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    PubKeyHash,
    ScriptHash,
    NonStandard,
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputType::PubKeyHash => "pubkeyhash",
            OutputType::ScriptHash => "scripthash",
            OutputType::NonStandard => "nonstandard",
        };
        f.write_str(name)
    }
}

/// Name the template `script` matches.
pub fn classify_output(script: &Script) -> OutputType {
    if pubkey_hash::output::check(script) {
        OutputType::PubKeyHash
    } else if script_hash::output::check(script) {
        OutputType::ScriptHash
    } else {
        OutputType::NonStandard
    }
}
