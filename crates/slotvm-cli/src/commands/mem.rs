//! Memory pricing commands

use clap::Subcommand;
use slotvm_evm::MemoryCostPolicy;

use crate::config::Config;
use crate::output::Output;
use crate::CliError;

/// Memory subcommands
#[derive(Debug, Subcommand)]
pub enum MemCommand {
    /// Cost of growing an empty memory to cover `bytes`
    Cost {
        /// Bytes touched
        #[arg(long)]
        bytes: u64,
    },
}

impl MemCommand {
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        match self {
            MemCommand::Cost { bytes } => {
                let words = bytes.div_ceil(32);
                let cost = config.vm.memory.cost(words);
                let msize = words.saturating_mul(32);
                let over_limit = msize > config.vm.max_memory_bytes as u64;
                Output::new(json)
                    .field_u64("words", words)
                    .field_u64("msize", msize)
                    .field_u64("cost", cost)
                    .field_bool("over_limit", over_limit)
                    .message(&format!(
                        "{} words (msize {}): cost {}{}",
                        words,
                        msize,
                        cost,
                        if over_limit { " [exceeds memory limit]" } else { "" }
                    ))
                    .print();
                Ok(())
            }
        }
    }
}
