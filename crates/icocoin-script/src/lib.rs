//! icocoin script layer.
//!
//! Opcode table, the chunk compiler/decompiler, the `Script` value, the
//! script-number codec, standard templates and the address codec. Scripts
//! are compiled and recognized here, never executed.

pub mod address;
pub mod chunk;
pub mod number;
pub mod opcodes;
pub mod script;
pub mod templates;

mod error;
pub use address::Address;
pub use chunk::Chunk;
pub use error::ScriptError;
pub use script::Script;
pub use templates::{classify_output, OutputType};
