//! Sparse slot storage for a single account

use crate::packed::PackedField;
use slotvm_primitives::Word;
use std::collections::BTreeMap;

/// Mapping from 256-bit slot number to 256-bit word.
///
/// Absent slots read as zero; writing zero removes the entry, so two maps
/// with the same observable contents compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageMap {
    slots: BTreeMap<Word, Word>,
}

impl StorageMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a slot (zero if never written)
    pub fn read(&self, slot: &Word) -> Word {
        self.slots.get(slot).copied().unwrap_or_default()
    }

    /// Overwrite a slot, returning the previous value
    pub fn write(&mut self, slot: Word, value: Word) -> Word {
        let previous = if value.is_zero() {
            self.slots.remove(&slot)
        } else {
            self.slots.insert(slot, value)
        };
        previous.unwrap_or_default()
    }

    /// Read a sub-word field
    pub fn read_packed(&self, field: &PackedField) -> Word {
        field.extract(self.read(&field.slot()))
    }

    /// Write a sub-word field with one read-modify-write of its slot.
    ///
    /// Returns the previous raw slot value.
    pub fn write_packed(&mut self, field: &PackedField, value: Word) -> Word {
        let raw = self.read(&field.slot());
        self.write(field.slot(), field.insert(raw, value))
    }

    /// Number of non-zero slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether every slot is zero
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Non-zero slots in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = (&Word, &Word)> {
        self.slots.iter()
    }

    /// Remove every slot
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl FromIterator<(Word, Word)> for StorageMap {
    fn from_iter<I: IntoIterator<Item = (Word, Word)>>(iter: I) -> Self {
        let mut map = StorageMap::new();
        for (slot, value) in iter {
            map.write(slot, value);
        }
        map
    }
}
