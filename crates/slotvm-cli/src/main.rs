//! # slotvm-cli
//!
//! Command-line interface for the slotvm execution simulator.
//!
//! ## Usage
//!
//! ```bash
//! # Storage locations
//! slotvm slot list --base 5 --index 1
//! slotvm slot map --base 0 --key 0x01
//! slotvm slot map --base 0 --key alice --bytes-key
//! slotvm slot nested --base 1 --outer 2 --inner 3
//!
//! # Packed fields
//! slotvm pack read --word 0x...04 --offset 128 --width 96
//! slotvm pack write --word 0x...04 --offset 224 --width 16 --value 0x0a
//!
//! # Pricing and signatures
//! slotvm mem cost --bytes 4096
//! slotvm selector "transfer(address,uint256)"
//! slotvm topic "Transfer(address,address,uint256)"
//!
//! # Built-in contracts
//! slotvm demo nested-revert
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// slotvm CLI
#[derive(Parser, Debug)]
#[command(name = "slotvm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to ~/.slotvm/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log execution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute storage locations
    #[command(subcommand)]
    Slot(commands::slot::SlotCommand),
    /// Read or write packed fields
    #[command(subcommand)]
    Pack(commands::pack::PackCommand),
    /// Memory pricing
    #[command(subcommand)]
    Mem(commands::mem::MemCommand),
    /// Function selector of a signature
    Selector {
        /// Signature such as "transfer(address,uint256)"
        signature: String,
    },
    /// Event topic of a signature
    Topic {
        /// Signature such as "Transfer(address,address,uint256)"
        signature: String,
    },
    /// Run a built-in contract scenario
    Demo {
        /// Scenario to run
        #[arg(value_enum)]
        scenario: commands::demo::DemoScenario,
        /// Override the call-depth limit
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the demo budget
        #[arg(long)]
        set_budget: Option<u64>,
        /// Set the call-depth limit
        #[arg(long)]
        set_max_depth: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = Config::load(cli.config.as_deref()).and_then(|mut config| match cli.command {
        Commands::Slot(cmd) => cmd.execute(cli.json),
        Commands::Pack(cmd) => cmd.execute(cli.json),
        Commands::Mem(cmd) => cmd.execute(&config, cli.json),
        Commands::Selector { signature } => commands::signature::selector(&signature, cli.json),
        Commands::Topic { signature } => commands::signature::topic(&signature, cli.json),
        Commands::Demo {
            scenario,
            max_depth,
        } => commands::demo::run(scenario, max_depth, &config, cli.json),
        Commands::Config {
            show,
            set_budget,
            set_max_depth,
        } => handle_config(
            &mut config,
            cli.config.as_deref(),
            show,
            set_budget,
            set_max_depth,
            cli.json,
        ),
    });

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn handle_config(
    config: &mut Config,
    path: Option<&std::path::Path>,
    show: bool,
    set_budget: Option<u64>,
    set_max_depth: Option<usize>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(budget) = set_budget {
        config.budget = budget;
        modified = true;
    }

    if let Some(depth) = set_max_depth {
        config.vm.max_call_depth = depth;
        modified = true;
    }

    if modified {
        let saved = match path {
            Some(path) => {
                config.save_to(path)?;
                path.to_path_buf()
            }
            None => config.save()?,
        };
        Output::new(json)
            .field("status", "saved")
            .field("path", &saved.display().to_string())
            .message(&format!("Configuration saved to {}", saved.display()))
            .print();
    } else if show {
        let rendered = toml::to_string_pretty(config).map_err(|e| CliError::Config(e.to_string()))?;
        Output::new(json)
            .field_u64("budget", config.budget)
            .field_value("vm", serde_json::to_value(&config.vm)?)
            .message(rendered.trim_end())
            .print();
    } else {
        Output::new(json)
            .message("Use --show to display config, or --set-budget/--set-max-depth to modify")
            .print();
    }

    Ok(())
}
