//! Journaled account state

use crate::error::{StorageError, StorageResult};
use crate::map::StorageMap;
use crate::packed::PackedField;
use crate::traits::{StateReader, StateWriter};
use slotvm_primitives::{Address, Word};
use std::collections::BTreeMap;

/// Account data
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    /// Slot storage owned by the account
    pub storage: StorageMap,
}

impl Account {
    /// Create an account with empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account with pre-populated storage
    pub fn with_storage(storage: StorageMap) -> Self {
        Self { storage }
    }
}

/// Undo record for one state mutation
#[derive(Clone, Debug)]
enum JournalEntry {
    /// Account did not exist before this write
    AccountCreated { address: Address },
    /// Account was removed; keeps its previous contents
    AccountRemoved { address: Address, account: Account },
    /// Slot held `previous` before the write
    StorageChanged {
        address: Address,
        slot: Word,
        previous: Word,
    },
}

/// Position in the journal that a frame can roll back to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    journal_len: usize,
    depth: usize,
}

impl Checkpoint {
    /// Nesting level of the checkpoint (0 for the outermost)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// All accounts plus the journal needed to roll nested frames back.
///
/// Every mutation appends an undo record while a checkpoint is open.
/// Reverting to a checkpoint undoes everything recorded after it,
/// including the effects of inner checkpoints that were already
/// committed. Once the outermost checkpoint commits the journal is dropped.
#[derive(Clone, Debug, Default)]
pub struct WorldState {
    accounts: BTreeMap<Address, Account>,
    journal: Vec<JournalEntry>,
    open_checkpoints: usize,
}

impl WorldState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account outside of any journal
    pub fn insert_account(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, account);
    }

    /// Builder form of [`WorldState::insert_account`]
    pub fn with_account(mut self, address: Address, storage: StorageMap) -> Self {
        self.insert_account(address, Account::with_storage(storage));
        self
    }

    /// Account by address
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    /// Storage of an account
    pub fn storage(&self, address: &Address) -> Option<&StorageMap> {
        self.accounts.get(address).map(|a| &a.storage)
    }

    /// Whether the account is present
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Addresses in ascending order
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.accounts.keys()
    }

    /// Read a slot (zero for unknown accounts and unset slots)
    pub fn read(&self, address: &Address, slot: &Word) -> Word {
        self.accounts
            .get(address)
            .map(|a| a.storage.read(slot))
            .unwrap_or_default()
    }

    /// Read a packed field
    pub fn read_packed(&self, address: &Address, field: &PackedField) -> Word {
        field.extract(self.read(address, &field.slot()))
    }

    /// Overwrite a slot, creating the account if needed. Returns the previous value.
    pub fn write(&mut self, address: Address, slot: Word, value: Word) -> Word {
        let account = self.account_mut_or_create(address);
        let previous = account.storage.write(slot, value);
        if previous != value {
            self.record(JournalEntry::StorageChanged {
                address,
                slot,
                previous,
            });
        }
        previous
    }

    /// Write a packed field as one journaled read-modify-write of its slot
    pub fn write_packed(&mut self, address: Address, field: &PackedField, value: Word) -> Word {
        let raw = self.read(&address, &field.slot());
        self.write(address, field.slot(), field.insert(raw, value))
    }

    /// Remove an account and its storage
    pub fn remove_account(&mut self, address: &Address) -> Option<Account> {
        let removed = self.accounts.remove(address)?;
        self.record(JournalEntry::AccountRemoved {
            address: *address,
            account: removed.clone(),
        });
        Some(removed)
    }

    /// Open a checkpoint
    pub fn checkpoint(&mut self) -> Checkpoint {
        let checkpoint = Checkpoint {
            journal_len: self.journal.len(),
            depth: self.open_checkpoints,
        };
        self.open_checkpoints += 1;
        tracing::trace!(depth = checkpoint.depth, "checkpoint opened");
        checkpoint
    }

    /// Keep everything since `checkpoint`.
    ///
    /// The undo records stay in the journal so that an enclosing checkpoint
    /// can still roll them back.
    pub fn commit(&mut self, checkpoint: Checkpoint) -> StorageResult<()> {
        self.close(checkpoint)?;
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
        Ok(())
    }

    /// Undo everything recorded since `checkpoint`
    pub fn revert_to(&mut self, checkpoint: Checkpoint) -> StorageResult<()> {
        self.close(checkpoint)?;
        let undone = self.journal.len() - checkpoint.journal_len;
        while self.journal.len() > checkpoint.journal_len {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
        tracing::trace!(depth = checkpoint.depth, undone, "checkpoint reverted");
        Ok(())
    }

    /// Number of checkpoints still open
    pub fn open_checkpoints(&self) -> usize {
        self.open_checkpoints
    }

    /// Write every account into a persistence backend
    pub fn flush_into<W: StateWriter>(&self, backend: &mut W) -> StorageResult<()> {
        for (address, account) in &self.accounts {
            for (slot, value) in account.storage.iter() {
                backend.set_storage(*address, *slot, *value)?;
            }
        }
        Ok(())
    }

    fn close(&mut self, checkpoint: Checkpoint) -> StorageResult<()> {
        // checkpoints close innermost first
        if checkpoint.depth + 1 != self.open_checkpoints
            || checkpoint.journal_len > self.journal.len()
        {
            return Err(StorageError::UnknownCheckpoint(checkpoint.journal_len));
        }
        self.open_checkpoints -= 1;
        Ok(())
    }

    fn record(&mut self, entry: JournalEntry) {
        if self.open_checkpoints > 0 {
            self.journal.push(entry);
        }
    }

    fn account_mut_or_create(&mut self, address: Address) -> &mut Account {
        if !self.accounts.contains_key(&address) {
            self.record(JournalEntry::AccountCreated { address });
        }
        self.accounts.entry(address).or_default()
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::AccountCreated { address } => {
                self.accounts.remove(&address);
            }
            JournalEntry::AccountRemoved { address, account } => {
                self.accounts.insert(address, account);
            }
            JournalEntry::StorageChanged {
                address,
                slot,
                previous,
            } => {
                if let Some(account) = self.accounts.get_mut(&address) {
                    account.storage.write(slot, previous);
                }
            }
        }
    }
}

impl StateReader for WorldState {
    fn storage_at(&self, address: &Address, slot: &Word) -> StorageResult<Word> {
        Ok(self.read(address, slot))
    }

    fn account_exists(&self, address: &Address) -> StorageResult<bool> {
        Ok(self.contains(address))
    }
}

impl StateWriter for WorldState {
    fn set_storage(&mut self, address: Address, slot: Word, value: Word) -> StorageResult<()> {
        self.write(address, slot, value);
        Ok(())
    }

    fn delete_account(&mut self, address: &Address) -> StorageResult<()> {
        self.remove_account(address);
        Ok(())
    }
}
