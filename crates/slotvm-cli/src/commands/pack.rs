//! Packed field commands

use clap::Subcommand;
use slotvm_primitives::Word;
use slotvm_storage::PackedField;

use super::word_arg;
use crate::output::{word_hex, Output};
use crate::CliError;

/// Pack subcommands
#[derive(Debug, Subcommand)]
pub enum PackCommand {
    /// Extract a field from a slot value
    Read {
        /// Raw slot value
        #[arg(long, value_parser = word_arg)]
        word: Word,
        /// Lowest bit of the field
        #[arg(long)]
        offset: u32,
        /// Field width in bits
        #[arg(long)]
        width: u32,
    },
    /// Replace a field inside a slot value
    Write {
        /// Raw slot value
        #[arg(long, value_parser = word_arg)]
        word: Word,
        /// Lowest bit of the field
        #[arg(long)]
        offset: u32,
        /// Field width in bits
        #[arg(long)]
        width: u32,
        /// New field value; bits above the width are dropped
        #[arg(long, value_parser = word_arg)]
        value: Word,
    },
}

impl PackCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        match self {
            PackCommand::Read {
                word,
                offset,
                width,
            } => {
                let field = PackedField::new(Word::zero(), offset, width)?;
                let value = field.extract(word);
                Output::new(json)
                    .field_word("value", &value)
                    .message(&word_hex(&value))
                    .print();
                Ok(())
            }
            PackCommand::Write {
                word,
                offset,
                width,
                value,
            } => {
                let field = PackedField::new(Word::zero(), offset, width)?;
                let updated = field.insert(word, value);
                Output::new(json)
                    .field_word("word", &updated)
                    .message(&word_hex(&updated))
                    .print();
                Ok(())
            }
        }
    }
}
