//! Storage error types

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Packed field does not fit inside one 256-bit slot
    #[error("invalid packed field: offset {offset} + width {width} exceeds 256 bits")]
    InvalidPackedField {
        /// Bit offset from the least significant bit
        offset: u32,
        /// Field width in bits
        width: u32,
    },

    /// Checkpoint is not open on this state
    #[error("unknown checkpoint at journal position {0}")]
    UnknownCheckpoint(usize),

    /// Persistence backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
