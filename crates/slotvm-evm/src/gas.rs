//! Resource budget and cost calculations

use crate::error::{VmError, VmResult};
use serde::{Deserialize, Serialize};
use slotvm_primitives::Word;
use std::fmt;

/// Default costs
pub mod cost {
    /// Storage read
    pub const SLOAD: u64 = 100;
    /// Storage write turning a zero slot non-zero
    pub const SSTORE_SET: u64 = 20000;
    /// Any other storage write
    pub const SSTORE_RESET: u64 = 2900;

    /// Log base gas
    pub const LOG: u64 = 375;
    /// Log topic gas
    pub const LOG_TOPIC: u64 = 375;
    /// Log data gas (per byte)
    pub const LOG_DATA: u64 = 8;

    /// Keccak base gas
    pub const SHA3: u64 = 30;
    /// Keccak word gas
    pub const SHA3_WORD: u64 = 6;

    /// Nested call base gas
    pub const CALL: u64 = 100;
    /// Selfdestruct gas
    pub const SELFDESTRUCT: u64 = 5000;

    /// Memory gas per word
    pub const MEMORY: u64 = 3;
    /// Divisor of the quadratic memory term
    pub const MEMORY_QUADRATIC_DIVISOR: u64 = 512;

    /// Max call depth
    pub const MAX_CALL_DEPTH: usize = 1024;
    /// Max memory per frame (32 MiB)
    pub const MAX_MEMORY_BYTES: usize = 32 * 1024 * 1024;
}

/// Budget of one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gas {
    limit: u64,
    used: u64,
}

impl Gas {
    /// Budget of `limit`
    pub fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Budget given as a word; values above `u64::MAX` saturate
    pub fn from_word(budget: &Word) -> Self {
        let limit = if budget.bits() > 64 {
            u64::MAX
        } else {
            budget.low_u64()
        };
        Self::new(limit)
    }

    /// Total budget
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Gas spent so far
    pub fn used(&self) -> u64 {
        self.used
    }

    /// Gas left
    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    /// Charge `amount`, failing without partial charge if it does not fit
    pub fn record_cost(&mut self, amount: u64) -> VmResult<()> {
        if amount > self.remaining() {
            return Err(VmError::OutOfResource);
        }
        self.used += amount;
        Ok(())
    }

    /// Spend whatever is left
    pub fn consume_all(&mut self) {
        self.used = self.limit;
    }
}

/// Pricing curve for memory growth.
///
/// `cost(words)` is the total charge for a memory of `words` 32-byte words;
/// growing from `a` to `b` words costs `cost(b) - cost(a)`.
pub trait MemoryCostPolicy: fmt::Debug + Send + Sync {
    /// Total cost of a memory of `words` words
    fn cost(&self, words: u64) -> u64;

    /// Cost of growing from `current_words` to `new_words`
    fn expansion_cost(&self, current_words: u64, new_words: u64) -> u64 {
        if new_words <= current_words {
            return 0;
        }
        self.cost(new_words).saturating_sub(self.cost(current_words))
    }
}

/// `word_cost * w + w * w / quadratic_divisor`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadraticMemoryCost {
    /// Linear charge per word
    pub word_cost: u64,
    /// Divisor of the quadratic term (0 disables it)
    pub quadratic_divisor: u64,
}

impl Default for QuadraticMemoryCost {
    fn default() -> Self {
        Self {
            word_cost: cost::MEMORY,
            quadratic_divisor: cost::MEMORY_QUADRATIC_DIVISOR,
        }
    }
}

impl MemoryCostPolicy for QuadraticMemoryCost {
    fn cost(&self, words: u64) -> u64 {
        let words = u128::from(words);
        let linear = u128::from(self.word_cost) * words;
        let quadratic = match self.quadratic_divisor {
            0 => 0,
            divisor => words * words / u128::from(divisor),
        };
        u64::try_from(linear + quadratic).unwrap_or(u64::MAX)
    }
}

/// Flat per-operation costs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Storage read
    pub sload: u64,
    /// Storage write turning a zero slot non-zero
    pub sstore_set: u64,
    /// Any other storage write
    pub sstore_reset: u64,
    /// Log base
    pub log: u64,
    /// Per topic
    pub log_topic: u64,
    /// Per data byte
    pub log_data: u64,
    /// Keccak base
    pub sha3: u64,
    /// Keccak per word
    pub sha3_word: u64,
    /// Nested call base
    pub call: u64,
    /// Self-destruct
    pub selfdestruct: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            sload: cost::SLOAD,
            sstore_set: cost::SSTORE_SET,
            sstore_reset: cost::SSTORE_RESET,
            log: cost::LOG,
            log_topic: cost::LOG_TOPIC,
            log_data: cost::LOG_DATA,
            sha3: cost::SHA3,
            sha3_word: cost::SHA3_WORD,
            call: cost::CALL,
            selfdestruct: cost::SELFDESTRUCT,
        }
    }
}

impl GasSchedule {
    /// Cost of writing `new` over `current`
    pub fn sstore_gas(&self, current: &Word, new: &Word) -> u64 {
        if current.is_zero() && !new.is_zero() {
            self.sstore_set
        } else {
            self.sstore_reset
        }
    }

    /// Cost of a log with `topics` topics and `data_size` bytes
    pub fn log_gas(&self, topics: usize, data_size: usize) -> u64 {
        self.log
            .saturating_add(self.log_topic.saturating_mul(topics as u64))
            .saturating_add(self.log_data.saturating_mul(data_size as u64))
    }

    /// Cost of hashing `length` bytes
    pub fn sha3_gas(&self, length: usize) -> u64 {
        let words = length.div_ceil(32) as u64;
        self.sha3.saturating_add(self.sha3_word.saturating_mul(words))
    }
}

/// Gas a nested call may take: the request, capped at all but 1/64 of what is left
pub fn forwarded_gas(requested: u64, remaining: u64) -> u64 {
    requested.min(remaining - remaining / 64)
}
