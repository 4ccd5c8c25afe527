//! Execution limits and pricing

use crate::gas::{cost, GasSchedule, QuadraticMemoryCost};
use serde::{Deserialize, Serialize};

/// Limits and prices applied to every invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// Deepest nesting allowed; the outermost frame has depth 0
    pub max_call_depth: usize,
    /// Per-frame memory ceiling in bytes
    pub max_memory_bytes: usize,
    /// Memory growth pricing
    pub memory: QuadraticMemoryCost,
    /// Flat operation costs
    pub gas: GasSchedule,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: cost::MAX_CALL_DEPTH,
            max_memory_bytes: cost::MAX_MEMORY_BYTES,
            memory: QuadraticMemoryCost::default(),
            gas: GasSchedule::default(),
        }
    }
}

impl VmConfig {
    /// Override the call-depth limit
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Override the memory ceiling
    pub fn with_max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = bytes;
        self
    }
}
