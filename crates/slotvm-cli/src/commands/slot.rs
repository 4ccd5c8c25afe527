//! Storage location commands

use clap::Subcommand;
use slotvm_primitives::Word;
use slotvm_storage::layout::{
    bytes_key_map_entry_location, list_element_location, map_entry_location,
    nested_map_entry_location, packed_list_element_location,
};

use super::word_arg;
use crate::output::{word_hex, Output};
use crate::CliError;

/// Slot subcommands
#[derive(Debug, Subcommand)]
pub enum SlotCommand {
    /// Location of a list element
    List {
        /// Slot holding the list length
        #[arg(long, value_parser = word_arg)]
        base: Word,
        /// Element index
        #[arg(long, value_parser = word_arg)]
        index: Word,
        /// Element width in bits when elements are packed
        #[arg(long)]
        element_bits: Option<u32>,
    },
    /// Location of a mapping entry
    Map {
        /// Slot the mapping is declared at
        #[arg(long, value_parser = word_arg)]
        base: Word,
        /// Key (a word, or raw text with --bytes-key)
        #[arg(long)]
        key: String,
        /// Hash the key as raw bytes instead of a word
        #[arg(long)]
        bytes_key: bool,
    },
    /// Location of a nested mapping entry
    Nested {
        /// Slot the outer mapping is declared at
        #[arg(long, value_parser = word_arg)]
        base: Word,
        /// Outer key
        #[arg(long, value_parser = word_arg)]
        outer: Word,
        /// Inner key
        #[arg(long, value_parser = word_arg)]
        inner: Word,
    },
}

impl SlotCommand {
    pub fn execute(self, json: bool) -> Result<(), CliError> {
        match self {
            SlotCommand::List {
                base,
                index,
                element_bits,
            } => list(base, index, element_bits, json),
            SlotCommand::Map {
                base,
                key,
                bytes_key,
            } => map(base, &key, bytes_key, json),
            SlotCommand::Nested { base, outer, inner } => {
                let slot = nested_map_entry_location(base, outer, inner);
                Output::new(json)
                    .field_word("slot", &slot)
                    .message(&word_hex(&slot))
                    .print();
                Ok(())
            }
        }
    }
}

fn list(base: Word, index: Word, element_bits: Option<u32>, json: bool) -> Result<(), CliError> {
    let Some(bits) = element_bits else {
        let slot = list_element_location(base, index);
        Output::new(json)
            .field_word("slot", &slot)
            .message(&word_hex(&slot))
            .print();
        return Ok(());
    };

    let field = packed_list_element_location(base, index, bits)?;
    Output::new(json)
        .field_word("slot", &field.slot())
        .field_u64("offset", u64::from(field.offset()))
        .field_u64("width", u64::from(field.width()))
        .message(&format!(
            "{} bits {}..{}",
            word_hex(&field.slot()),
            field.offset(),
            field.offset() + field.width()
        ))
        .print();
    Ok(())
}

fn map(base: Word, key: &str, bytes_key: bool, json: bool) -> Result<(), CliError> {
    let slot = if bytes_key {
        bytes_key_map_entry_location(base, key.as_bytes())
    } else {
        let key = word_arg(key).map_err(CliError::InvalidWord)?;
        map_entry_location(base, key)
    };
    Output::new(json)
        .field_word("slot", &slot)
        .message(&word_hex(&slot))
        .print();
    Ok(())
}
