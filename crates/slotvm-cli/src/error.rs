//! CLI error types

use slotvm_storage::StorageError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Value that is not a 256-bit word
    #[error("Invalid word: {0}")]
    InvalidWord(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage layout error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Demo contract did not behave as expected
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}
