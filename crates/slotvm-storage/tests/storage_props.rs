//! Property tests for packed fields and hashed storage locations

use proptest::prelude::*;
use slotvm_primitives::{low_mask, Address, Word};
use slotvm_storage::layout::{list_data_start, list_element_location, map_entry_location};
use slotvm_storage::{PackedField, StorageMap, WorldState};

fn any_word() -> impl Strategy<Value = Word> {
    any::<[u64; 4]>().prop_map(|limbs| Word { 0: limbs })
}

/// (offset, width) pairs that fit in one slot
fn field_coords() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=256).prop_flat_map(|width| (0..=(256 - width), Just(width)))
}

proptest! {
    #[test]
    fn packed_write_then_read_roundtrips(
        slot in any_word(),
        raw in any_word(),
        (offset, width) in field_coords(),
        value in any_word(),
    ) {
        let value = value & low_mask(width);
        let field = PackedField::new(slot, offset, width).unwrap();
        let mut map: StorageMap = [(slot, raw)].into_iter().collect();

        map.write_packed(&field, value);

        prop_assert_eq!(map.read_packed(&field), value);
        let outside = Word::MAX ^ field.slot_mask();
        prop_assert_eq!(map.read(&slot) & outside, raw & outside);
    }

    #[test]
    fn packed_write_leaves_other_slots(
        slot in any_word(),
        other in any_word(),
        other_value in any_word(),
        (offset, width) in field_coords(),
        value in any_word(),
    ) {
        prop_assume!(slot != other);
        let field = PackedField::new(slot, offset, width).unwrap();
        let mut map: StorageMap = [(other, other_value)].into_iter().collect();
        map.write_packed(&field, value);
        prop_assert_eq!(map.read(&other), other_value);
    }

    #[test]
    fn map_locations_distinct(
        base_a in any_word(),
        key_a in any_word(),
        base_b in any_word(),
        key_b in any_word(),
    ) {
        prop_assume!((base_a, key_a) != (base_b, key_b));
        prop_assert_ne!(
            map_entry_location(base_a, key_a),
            map_entry_location(base_b, key_b)
        );
    }

    #[test]
    fn list_elements_are_offsets_from_data_start(base in any_word(), index in any::<u64>()) {
        let start = list_data_start(base);
        prop_assert_eq!(
            list_element_location(base, Word::from(index)),
            start.overflowing_add(Word::from(index)).0
        );
    }

    #[test]
    fn revert_restores_every_slot(
        initial in proptest::collection::vec((0u64..16, any_word()), 0..8),
        writes in proptest::collection::vec((0u64..16, any_word()), 1..16),
    ) {
        let address = Address::from_low_u64(1);
        let storage: StorageMap = initial
            .iter()
            .map(|(slot, value)| (Word::from(*slot), *value))
            .collect();
        let mut state = WorldState::new().with_account(address, storage.clone());

        let checkpoint = state.checkpoint();
        for (slot, value) in &writes {
            state.write(address, Word::from(*slot), *value);
        }
        state.revert_to(checkpoint).unwrap();

        prop_assert_eq!(state.storage(&address), Some(&storage));
    }
}
