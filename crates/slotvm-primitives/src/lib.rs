//! # slotvm-primitives
//!
//! Primitive types for the slotvm execution simulator.
//!
//! Every storage slot, memory word, topic and stack-free handler value is a
//! [`Word`]: a 256-bit unsigned integer whose arithmetic wraps modulo 2^256.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
mod selector;
mod word;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};
pub use selector::{Selector, SelectorError};
pub use word::{
    from_bytes32, is_negative, low_mask, parse_word, signed_lt, to_bytes32, word_to_usize,
    Word, WORD_BITS, WORD_BYTES,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_wraps() {
        let a = Word::MAX;
        let (sum, overflow) = a.overflowing_add(Word::from(2u64));
        assert!(overflow);
        assert_eq!(sum, Word::one());
    }
}
