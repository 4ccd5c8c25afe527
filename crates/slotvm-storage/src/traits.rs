//! Persistence backend traits

use crate::error::StorageResult;
use slotvm_primitives::{Address, Word};

/// Point reads against committed state
pub trait StateReader {
    /// Storage value at `slot` of `address` (zero if unset)
    fn storage_at(&self, address: &Address, slot: &Word) -> StorageResult<Word>;

    /// Whether the account is present
    fn account_exists(&self, address: &Address) -> StorageResult<bool>;
}

/// Point writes against committed state
pub trait StateWriter {
    /// Set storage value (zero clears the slot)
    fn set_storage(&mut self, address: Address, slot: Word, value: Word) -> StorageResult<()>;

    /// Remove an account and all of its storage
    fn delete_account(&mut self, address: &Address) -> StorageResult<()>;
}
