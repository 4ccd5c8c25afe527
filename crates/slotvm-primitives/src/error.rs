//! Common error types for primitives

use crate::address::AddressError;
use crate::hash::HashError;
use crate::selector::SelectorError;
use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Selector error
    #[error("selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Not a hex or decimal 256-bit number
    #[error("invalid word: {0}")]
    InvalidWord(String),
}
