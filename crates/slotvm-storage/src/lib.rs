//! # slotvm-storage
//!
//! Persistent slot storage for slotvm.
//!
//! This crate provides:
//! - [`StorageMap`]: sparse slot-to-word map owned by one account
//! - [`PackedField`]: sub-word fields sharing a slot
//! - [`layout`]: hashed locations of list elements and table entries
//! - [`WorldState`]: accounts plus a journal for frame-level rollback
//! - [`StateReader`] / [`StateWriter`]: the seam to a persistence backend

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
pub mod layout;
mod map;
mod packed;
mod traits;
mod world;

pub use error::{StorageError, StorageResult};
pub use map::StorageMap;
pub use packed::PackedField;
pub use traits::{StateReader, StateWriter};
pub use world::{Account, Checkpoint, WorldState};
