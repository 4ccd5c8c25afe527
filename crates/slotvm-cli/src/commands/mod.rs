//! CLI subcommands

pub mod demo;
pub mod mem;
pub mod pack;
pub mod signature;
pub mod slot;

use slotvm_primitives::{parse_word, Word};

/// Clap value parser for decimal or 0x-hex words
pub(crate) fn word_arg(s: &str) -> Result<Word, String> {
    parse_word(s).map_err(|e| e.to_string())
}
