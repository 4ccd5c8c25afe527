//! Frame-local scratch memory

use crate::error::{VmError, VmResult};
use crate::gas::{cost, Gas, MemoryCostPolicy, QuadraticMemoryCost};
use slotvm_primitives::{from_bytes32, to_bytes32, word_to_usize, Word, WORD_BYTES};
use std::sync::Arc;

/// Byte-addressable, zero-filled, auto-growing memory owned by one frame.
///
/// The arena length is the high-water mark (`msize`): the furthest byte ever
/// touched, rounded up to a 32-byte boundary. It never shrinks. Growth is
/// priced by a [`MemoryCostPolicy`] and charged to the caller's [`Gas`]
/// before anything is allocated.
#[derive(Clone, Debug)]
pub struct MemoryArena {
    data: Vec<u8>,
    policy: Arc<dyn MemoryCostPolicy>,
    max_bytes: usize,
}

impl Default for MemoryArena {
    fn default() -> Self {
        Self::new(Arc::new(QuadraticMemoryCost::default()), cost::MAX_MEMORY_BYTES)
    }
}

impl MemoryArena {
    /// Empty arena priced by `policy`, hard-capped at `max_bytes`
    pub fn new(policy: Arc<dyn MemoryCostPolicy>, max_bytes: usize) -> Self {
        Self {
            data: Vec::new(),
            policy,
            max_bytes,
        }
    }

    /// High-water mark in bytes, always a multiple of 32
    pub fn size(&self) -> Word {
        Word::from(self.data.len())
    }

    /// High-water mark as a host size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been touched yet
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw contents up to the high-water mark
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Grow to cover `[offset, offset + len)` and return `offset` as a host index.
    ///
    /// `len` must be non-zero. Offsets beyond the host address space or the
    /// configured ceiling are `OutOfResource`, as is an unaffordable charge.
    fn expand(&mut self, offset: &Word, len: usize, gas: &mut Gas) -> VmResult<usize> {
        let start = word_to_usize(offset).ok_or(VmError::OutOfResource)?;
        let end = start.checked_add(len).ok_or(VmError::OutOfResource)?;
        if end <= self.data.len() {
            return Ok(start);
        }

        let new_len = end
            .div_ceil(WORD_BYTES)
            .checked_mul(WORD_BYTES)
            .ok_or(VmError::OutOfResource)?;
        if new_len > self.max_bytes {
            tracing::trace!(new_len, max = self.max_bytes, "memory ceiling hit");
            return Err(VmError::OutOfResource);
        }

        let current_words = (self.data.len() / WORD_BYTES) as u64;
        let new_words = (new_len / WORD_BYTES) as u64;
        let charge = self.policy.expansion_cost(current_words, new_words);
        gas.record_cost(charge)?;

        tracing::trace!(from = self.data.len(), to = new_len, charge, "memory expanded");
        self.data.resize(new_len, 0);
        Ok(start)
    }

    /// Load the 32-byte word at `offset`
    pub fn load(&mut self, offset: &Word, gas: &mut Gas) -> VmResult<Word> {
        let start = self.expand(offset, WORD_BYTES, gas)?;
        let mut word = [0u8; 32];
        word.copy_from_slice(&self.data[start..start + WORD_BYTES]);
        Ok(from_bytes32(&word))
    }

    /// Store 32 bytes at `offset`
    pub fn store(&mut self, offset: &Word, value: &Word, gas: &mut Gas) -> VmResult<()> {
        let start = self.expand(offset, WORD_BYTES, gas)?;
        self.data[start..start + WORD_BYTES].copy_from_slice(&to_bytes32(value));
        Ok(())
    }

    /// Store one byte at `offset`; the other 31 bytes of its word keep their contents
    pub fn store8(&mut self, offset: &Word, value: u8, gas: &mut Gas) -> VmResult<()> {
        let start = self.expand(offset, 1, gas)?;
        self.data[start] = value;
        Ok(())
    }

    /// Copy `size` bytes out of memory
    pub fn load_slice(&mut self, offset: &Word, size: usize, gas: &mut Gas) -> VmResult<Vec<u8>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let start = self.expand(offset, size, gas)?;
        Ok(self.data[start..start + size].to_vec())
    }

    /// Copy `data` into memory at `offset`
    pub fn store_slice(&mut self, offset: &Word, data: &[u8], gas: &mut Gas) -> VmResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let start = self.expand(offset, data.len(), gas)?;
        self.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Copy `size` bytes from `src` to `dest`; the ranges may overlap
    pub fn copy(&mut self, dest: &Word, src: &Word, size: usize, gas: &mut Gas) -> VmResult<()> {
        if size == 0 {
            return Ok(());
        }
        let furthest = if dest > src { dest } else { src };
        self.expand(furthest, size, gas)?;
        let src = self.expand(src, size, gas)?;
        let dest = self.expand(dest, size, gas)?;
        self.data.copy_within(src..src + size, dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: u64) -> Word {
        Word::from(n)
    }

    fn plenty() -> Gas {
        Gas::new(u64::MAX)
    }

    // ==================== Growth ====================

    #[test]
    fn test_memory_starts_empty() {
        let mem = MemoryArena::default();
        assert_eq!(mem.size(), Word::zero());
        assert!(mem.is_empty());
    }

    #[test]
    fn test_load_extends_high_water_mark() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        assert_eq!(mem.load(&w(0), &mut gas).unwrap(), Word::zero());
        assert_eq!(mem.size(), w(32));
        mem.load(&w(33), &mut gas).unwrap();
        assert_eq!(mem.size(), w(96));
    }

    #[test]
    fn test_store8_rounds_to_word() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        mem.store8(&w(32), 0xAA, &mut gas).unwrap();
        assert_eq!(mem.size(), w(64));
        assert_eq!(mem.data()[32], 0xAA);
    }

    #[test]
    fn test_no_shrink() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        mem.store(&w(100), &w(1), &mut gas).unwrap();
        let high = mem.size();
        mem.load(&w(0), &mut gas).unwrap();
        assert_eq!(mem.size(), high);
    }

    // ==================== Store semantics ====================

    #[test]
    fn test_store_load_roundtrip() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        let value = Word::from(0x1234_5678_90AB_CDEFu64) << 100;
        mem.store(&w(48), &value, &mut gas).unwrap();
        assert_eq!(mem.load(&w(48), &mut gas).unwrap(), value);
    }

    #[test]
    fn test_store8_keeps_rest_of_word() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        mem.store(&w(0), &Word::MAX, &mut gas).unwrap();
        mem.store8(&w(31), 0x00, &mut gas).unwrap();
        assert_eq!(mem.load(&w(0), &mut gas).unwrap(), Word::MAX - w(0xFF));
    }

    #[test]
    fn test_full_store_replaces_store8() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        mem.store8(&w(0), 0xFF, &mut gas).unwrap();
        mem.store(&w(0), &w(1), &mut gas).unwrap();
        assert_eq!(mem.data()[0], 0);
        assert_eq!(mem.load(&w(0), &mut gas).unwrap(), w(1));
    }

    #[test]
    fn test_slices() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        mem.store_slice(&w(0), &[1, 2, 3, 4, 5], &mut gas).unwrap();
        assert_eq!(mem.load_slice(&w(3), 5, &mut gas).unwrap(), vec![4, 5, 0, 0, 0]);
        assert!(mem.load_slice(&Word::MAX, 0, &mut gas).unwrap().is_empty());
    }

    #[test]
    fn test_copy_overlapping() {
        let mut mem = MemoryArena::default();
        let mut gas = plenty();
        mem.store_slice(&w(0), &[1, 2, 3, 4, 5], &mut gas).unwrap();
        mem.copy(&w(2), &w(0), 5, &mut gas).unwrap();
        assert_eq!(mem.load_slice(&w(0), 7, &mut gas).unwrap(), vec![1, 2, 1, 2, 3, 4, 5]);
        mem.copy(&w(0), &w(2), 5, &mut gas).unwrap();
        assert_eq!(mem.load_slice(&w(0), 5, &mut gas).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    // ==================== Cost accounting ====================

    #[test]
    fn test_growth_is_charged() {
        let mut mem = MemoryArena::default();
        let mut gas = Gas::new(1_000);
        mem.store(&w(0), &w(1), &mut gas).unwrap();
        assert_eq!(gas.used(), 3);
        mem.store(&w(0), &w(2), &mut gas).unwrap();
        assert_eq!(gas.used(), 3);
        mem.load(&w(32), &mut gas).unwrap();
        assert_eq!(gas.used(), 6);
    }

    #[test]
    fn test_huge_offset_runs_out() {
        let mut mem = MemoryArena::default();
        let mut gas = Gas::new(1_000_000);
        assert_eq!(
            mem.load(&(Word::one() << 200), &mut gas),
            Err(VmError::OutOfResource)
        );
        assert_eq!(mem.size(), Word::zero());
        assert_eq!(gas.used(), 0);
    }

    #[test]
    fn test_budget_exhaustion_does_not_allocate() {
        let mut mem = MemoryArena::default();
        let mut gas = Gas::new(100);
        // 64 words cost 3*64 + 8 = 200
        assert_eq!(mem.store8(&w(64 * 32 - 1), 1, &mut gas), Err(VmError::OutOfResource));
        assert!(mem.is_empty());
        assert_eq!(gas.used(), 0);
    }

    #[test]
    fn test_ceiling() {
        let mut mem = MemoryArena::new(Arc::new(QuadraticMemoryCost::default()), 64);
        let mut gas = plenty();
        mem.store(&w(32), &w(1), &mut gas).unwrap();
        assert_eq!(mem.store(&w(33), &w(1), &mut gas), Err(VmError::OutOfResource));
        assert_eq!(mem.size(), w(64));
    }

    #[test]
    fn test_custom_policy() {
        #[derive(Debug)]
        struct Flat;
        impl MemoryCostPolicy for Flat {
            fn cost(&self, words: u64) -> u64 {
                words * 10
            }
        }
        let mut mem = MemoryArena::new(Arc::new(Flat), 1024);
        let mut gas = plenty();
        mem.load(&w(64), &mut gas).unwrap();
        assert_eq!(gas.used(), 30);
    }
}
