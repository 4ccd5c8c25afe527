//! # slotvm-crypto
//!
//! Hashing for slotvm.
//!
//! - Keccak-256 digest
//! - Word-list hashing used for storage location derivation
//! - Selector and event-topic derivation for tooling that plays the
//!   compiler's role (the dispatcher itself only consumes selectors)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{event_topic, hash_words, keccak256, selector};
