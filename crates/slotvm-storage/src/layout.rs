//! Storage locations of dynamically sized structures.
//!
//! Growable lists and key-value tables never occupy sequential slots after
//! their declared base slot. Their contents live at digests derived from the
//! base slot, so independent structures land far apart without any
//! allocator or bookkeeping:
//!
//! - list: base slot holds the length, element `i` lives at `hash(base) + i`
//! - table: entry for `key` lives at `hash(key ++ base)`
//! - nested table: `hash(inner ++ hash(outer ++ base))`
//!
//! `++` is the big-endian 32-byte concatenation; `hash` is Keccak-256.

use crate::error::StorageResult;
use crate::packed::PackedField;
use slotvm_crypto::{hash_words, keccak256};
use slotvm_primitives::{to_bytes32, Word, WORD_BITS};

/// First data slot of a list whose length sits at `base_slot`
pub fn list_data_start(base_slot: Word) -> Word {
    hash_words(&[base_slot])
}

/// Slot of list element `index`; the addition wraps modulo 2^256
pub fn list_element_location(base_slot: Word, index: Word) -> Word {
    list_data_start(base_slot).overflowing_add(index).0
}

/// Location of a list element narrower than a word.
///
/// Elements of `element_width` bits are packed `256 / element_width` per
/// slot, lowest index in the lowest bits.
pub fn packed_list_element_location(
    base_slot: Word,
    index: Word,
    element_width: u32,
) -> StorageResult<PackedField> {
    // validates the width before it is used as a divisor
    PackedField::new(Word::zero(), 0, element_width)?;
    let per_slot = Word::from(WORD_BITS / element_width);
    let slot = list_element_location(base_slot, index / per_slot);
    let offset = (index % per_slot).low_u32() * element_width;
    PackedField::new(slot, offset, element_width)
}

/// Slot of the table entry for a word-sized `key`
pub fn map_entry_location(base_slot: Word, key: Word) -> Word {
    hash_words(&[key, base_slot])
}

/// Slot of the entry for `inner_key` in the table stored under `outer_key`
pub fn nested_map_entry_location(base_slot: Word, outer_key: Word, inner_key: Word) -> Word {
    map_entry_location(map_entry_location(base_slot, outer_key), inner_key)
}

/// Slot of the table entry for a byte-string key.
///
/// The key bytes are hashed unpadded, followed by the 32-byte base slot.
pub fn bytes_key_map_entry_location(base_slot: Word, key: &[u8]) -> Word {
    let mut preimage = Vec::with_capacity(key.len() + 32);
    preimage.extend_from_slice(key);
    preimage.extend_from_slice(&to_bytes32(&base_slot));
    keccak256(&preimage).to_word()
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotvm_primitives::{parse_word, H256};

    fn hex(word: Word) -> String {
        H256::from(word).to_hex()
    }

    #[test]
    fn test_list_data_start_vector() {
        assert_eq!(
            hex(list_data_start(Word::from(5u64))),
            "0x036b6384b5eca791c62761152d0c79bb0604c104a5fb6f4eb0703f3154bb3db0"
        );
    }

    #[test]
    fn test_list_element_consecutive() {
        let base = Word::from(5u64);
        let start = list_data_start(base);
        assert_eq!(list_element_location(base, Word::zero()), start);
        assert_eq!(list_element_location(base, Word::one()), start + Word::one());
        assert_eq!(
            list_element_location(base, Word::from(3u64)),
            start + Word::from(3u64)
        );
    }

    #[test]
    fn test_list_element_wraps() {
        let base = Word::from(5u64);
        let start = list_data_start(base);
        let index = Word::MAX - start + Word::one();
        assert_eq!(list_element_location(base, index), Word::zero());
    }

    #[test]
    fn test_map_entry_vector() {
        assert_eq!(
            hex(map_entry_location(Word::zero(), Word::one())),
            "0xada5013122d395ba3c54772283fb069b10426056ef8ca54750cb9bb552a59e7d"
        );
    }

    #[test]
    fn test_nested_map_entry_vector() {
        let base = Word::one();
        let outer = map_entry_location(base, Word::from(2u64));
        assert_eq!(
            hex(outer),
            "0xd9d16d34ffb15ba3a3d852f0d403e2ce1d691fb54de27ac87cd2f993f3ec330f"
        );
        assert_eq!(
            hex(nested_map_entry_location(base, Word::from(2u64), Word::from(3u64))),
            "0xc4660acc4bd0a40bb2aaddc291a83b2fbde6034df1730ebf08010adf2b678647"
        );
    }

    #[test]
    fn test_bytes_key_vector() {
        assert_eq!(
            hex(bytes_key_map_entry_location(Word::zero(), b"alice")),
            "0x064216b8d0874cf95a8b69358eb7aa0861242084c70e7c17ba9647580e7adf38"
        );
    }

    #[test]
    fn test_map_key_and_base_not_interchangeable() {
        let a = map_entry_location(Word::from(1u64), Word::from(2u64));
        let b = map_entry_location(Word::from(2u64), Word::from(1u64));
        assert_ne!(a, b);
    }

    #[test]
    fn test_packed_list_element() {
        let base = Word::from(3u64);
        let start = list_data_start(base);

        // uint8 elements: 32 per slot
        let e0 = packed_list_element_location(base, Word::from(0u64), 8).unwrap();
        let e31 = packed_list_element_location(base, Word::from(31u64), 8).unwrap();
        let e32 = packed_list_element_location(base, Word::from(32u64), 8).unwrap();
        assert_eq!((e0.slot(), e0.offset()), (start, 0));
        assert_eq!((e31.slot(), e31.offset()), (start, 248));
        assert_eq!((e32.slot(), e32.offset()), (start + Word::one(), 0));

        // uint96 elements: 2 per slot, top 64 bits unused
        let e1 = packed_list_element_location(base, Word::from(1u64), 96).unwrap();
        let e2 = packed_list_element_location(base, Word::from(2u64), 96).unwrap();
        assert_eq!((e1.slot(), e1.offset()), (start, 96));
        assert_eq!((e2.slot(), e2.offset()), (start + Word::one(), 0));
    }

    #[test]
    fn test_packed_list_rejects_bad_width() {
        assert!(packed_list_element_location(Word::zero(), Word::from(0u64), 0).is_err());
        assert!(packed_list_element_location(Word::zero(), Word::from(0u64), 300).is_err());
    }

    #[test]
    fn test_map_entry_of_large_key() {
        let key = parse_word("0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
            .unwrap();
        assert_ne!(
            map_entry_location(Word::zero(), key),
            map_entry_location(Word::zero(), Word::zero())
        );
    }
}
