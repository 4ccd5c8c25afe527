//! Top-level invocation entry point

use crate::config::VmConfig;
use crate::context::ExecutionContext;
use crate::dispatch::ContractRegistry;
use crate::error::ExecutionResult;
use crate::gas::MemoryCostPolicy;
use bytes::Bytes;
use slotvm_primitives::{Address, Word};
use slotvm_storage::WorldState;
use std::sync::Arc;

/// One top-level call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Originating account
    pub caller: Address,
    /// Contract to run
    pub target: Address,
    /// Selector followed by arguments
    pub input: Bytes,
    /// Resource budget; values above `u64::MAX` saturate
    pub budget: Word,
    /// Run read-only
    pub is_static: bool,
}

impl Message {
    /// Call `target` from `caller`
    pub fn new(caller: Address, target: Address, input: impl Into<Bytes>, budget: impl Into<Word>) -> Self {
        Self {
            caller,
            target,
            input: input.into(),
            budget: budget.into(),
            is_static: false,
        }
    }

    /// Same call, read-only
    pub fn read_only(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Runs messages against a world state with fixed limits
#[derive(Clone, Debug)]
pub struct Executor {
    config: VmConfig,
    memory_policy: Arc<dyn MemoryCostPolicy>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

impl Executor {
    /// Executor pricing memory with the configured quadratic curve
    pub fn new(config: VmConfig) -> Self {
        let memory_policy = Arc::new(config.memory);
        Self {
            config,
            memory_policy,
        }
    }

    /// Replace the memory pricing curve
    pub fn with_memory_policy(mut self, policy: Arc<dyn MemoryCostPolicy>) -> Self {
        self.memory_policy = policy;
        self
    }

    /// Limits in force
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Execute `message`.
    ///
    /// On success every storage write and log of the call tree is kept and a
    /// self-destruct of the target takes effect. On failure `state` is left
    /// exactly as it was.
    pub fn invoke(
        &self,
        state: &mut WorldState,
        registry: &ContractRegistry,
        message: Message,
    ) -> ExecutionResult {
        tracing::debug!(
            caller = %message.caller,
            target = %message.target,
            input_len = message.input.len(),
            "invoke"
        );
        let mut context = ExecutionContext::new(
            state,
            registry,
            &self.config,
            self.memory_policy.clone(),
            message.caller,
            message.target,
        );
        if message.is_static {
            context = context.read_only();
        }
        let result = context.execute(message.input, &message.budget);
        tracing::debug!(
            success = result.success,
            gas_used = result.gas_used,
            logs = result.logs.len(),
            "invoke finished"
        );
        result
    }
}
