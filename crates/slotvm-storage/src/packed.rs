//! Sub-word fields packed into a single slot

use crate::error::{StorageError, StorageResult};
use slotvm_primitives::{low_mask, Word, WORD_BITS};

/// A `(slot, bit offset, bit width)` triple naming a variable smaller than a word.
///
/// Offsets count from the least significant bit, so the first variable
/// declared in a slot sits at offset 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PackedField {
    slot: Word,
    offset: u32,
    width: u32,
}

impl PackedField {
    /// Create a field, rejecting zero widths and fields that spill past bit 255
    pub fn new(slot: Word, offset: u32, width: u32) -> StorageResult<Self> {
        if width == 0 || offset.checked_add(width).map_or(true, |end| end > WORD_BITS) {
            return Err(StorageError::InvalidPackedField { offset, width });
        }
        Ok(Self { slot, offset, width })
    }

    /// Field occupying a whole slot
    pub fn full(slot: Word) -> Self {
        Self {
            slot,
            offset: 0,
            width: WORD_BITS,
        }
    }

    /// Slot holding the field
    pub fn slot(&self) -> Word {
        self.slot
    }

    /// Bit offset from the least significant bit
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Width in bits
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask of the field's bits in slot position
    pub fn slot_mask(&self) -> Word {
        low_mask(self.width) << self.offset as usize
    }

    /// Read the field out of a raw slot value
    pub fn extract(&self, raw: Word) -> Word {
        (raw >> self.offset as usize) & low_mask(self.width)
    }

    /// Replace the field inside `raw`, leaving every other bit untouched.
    ///
    /// Bits of `value` above the field width are dropped.
    pub fn insert(&self, raw: Word, value: Word) -> Word {
        let mask = self.slot_mask();
        let cleared = raw & (Word::MAX ^ mask);
        cleared | ((value & low_mask(self.width)) << self.offset as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_field_bounds() {
        assert!(PackedField::new(Word::zero(), 0, 256).is_ok());
        assert!(PackedField::new(Word::zero(), 248, 8).is_ok());
        assert_eq!(
            PackedField::new(Word::zero(), 250, 8),
            Err(StorageError::InvalidPackedField { offset: 250, width: 8 })
        );
        assert_eq!(
            PackedField::new(Word::zero(), 0, 0),
            Err(StorageError::InvalidPackedField { offset: 0, width: 0 })
        );
        assert!(PackedField::new(Word::zero(), u32::MAX, 8).is_err());
        assert!(PackedField::new(Word::zero(), 0, 257).is_err());
    }

    #[test]
    fn test_extract() {
        let raw = Word::from(0xAABB_CCDDu64);
        let field = PackedField::new(Word::zero(), 8, 8).unwrap();
        assert_eq!(field.extract(raw), Word::from(0xCCu64));
    }

    #[test]
    fn test_insert_preserves_neighbours() {
        let raw = Word::from(0xAABB_CCDDu64);
        let field = PackedField::new(Word::zero(), 8, 8).unwrap();
        let updated = field.insert(raw, Word::from(0x11u64));
        assert_eq!(updated, Word::from(0xAABB_11DDu64));
    }

    #[test]
    fn test_insert_truncates_wide_value() {
        let field = PackedField::new(Word::zero(), 0, 4).unwrap();
        let updated = field.insert(Word::zero(), Word::from(0xFFu64));
        assert_eq!(updated, Word::from(0x0Fu64));
    }

    #[test]
    fn test_full_field() {
        let field = PackedField::full(Word::from(3u64));
        assert_eq!(field.slot_mask(), Word::MAX);
        assert_eq!(field.insert(Word::from(9u64), Word::MAX), Word::MAX);
        assert_eq!(field.extract(Word::from(9u64)), Word::from(9u64));
    }

    #[test]
    fn test_top_bits() {
        let field = PackedField::new(Word::zero(), 240, 16).unwrap();
        let updated = field.insert(Word::zero(), Word::from(0xBEEFu64));
        assert_eq!(updated >> 240, Word::from(0xBEEFu64));
        assert_eq!(field.extract(updated), Word::from(0xBEEFu64));
    }
}
