//! Execution context shared by all frames of one invocation

use crate::config::VmConfig;
use crate::dispatch::ContractRegistry;
use crate::error::{ExecutionResult, VmError, VmResult};
use crate::frame::{CallFrame, CallKind, FrameState};
use crate::gas::{forwarded_gas, Gas, MemoryCostPolicy};
use crate::log::{LogRecord, LogSink};
use crate::memory::MemoryArena;
use bytes::Bytes;
use slotvm_crypto::keccak256;
use slotvm_primitives::{Address, Word};
use slotvm_storage::{PackedField, WorldState};
use std::sync::Arc;

/// Headroom left before a nested frame moves to a fresh stack segment
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each additional stack segment
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// What a nested call hands back to its caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// Whether the callee returned
    pub success: bool,
    /// Return data, or the revert buffer
    pub output: Bytes,
    /// Why the callee failed
    pub error: Option<VmError>,
    /// Gas charged to the caller for the callee
    pub gas_used: u64,
}

impl CallOutcome {
    /// Callee returned `output`
    pub fn returned(output: Bytes, gas_used: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            gas_used,
        }
    }

    /// Callee failed with `error`
    pub fn failed(error: VmError, gas_used: u64) -> Self {
        Self {
            success: false,
            output: error.output(),
            error: Some(error),
            gas_used,
        }
    }

    /// Output on success; on failure, a revert of the caller carrying the
    /// callee's revert buffer
    pub fn into_result(self) -> VmResult<Bytes> {
        if self.success {
            Ok(self.output)
        } else {
            Err(VmError::Revert(self.output))
        }
    }
}

/// State of one top-level invocation.
///
/// Owns the log sink and the active frame, borrows the world state and the
/// deployed contracts. Handlers receive it mutably and reach storage,
/// memory, logs and nested calls only through it. It is consumed by
/// [`ExecutionContext::execute`], so it lives for exactly one top-level call.
pub struct ExecutionContext<'a> {
    state: &'a mut WorldState,
    registry: &'a ContractRegistry,
    config: &'a VmConfig,
    memory_policy: Arc<dyn MemoryCostPolicy>,
    logs: LogSink,
    frame: CallFrame,
}

impl<'a> ExecutionContext<'a> {
    /// Context for `caller` invoking `target`
    pub fn new(
        state: &'a mut WorldState,
        registry: &'a ContractRegistry,
        config: &'a VmConfig,
        memory_policy: Arc<dyn MemoryCostPolicy>,
        caller: Address,
        target: Address,
    ) -> Self {
        let memory = MemoryArena::new(memory_policy.clone(), config.max_memory_bytes);
        Self {
            state,
            registry,
            config,
            memory_policy,
            logs: LogSink::new(),
            frame: CallFrame::root(caller, target, memory),
        }
    }

    /// Run the outermost frame read-only
    pub fn read_only(mut self) -> Self {
        self.frame.is_static = true;
        self
    }

    /// Run `input` against the target with `budget` and report everything
    pub fn execute(mut self, input: impl Into<Bytes>, budget: &Word) -> ExecutionResult {
        self.frame.input = input.into();
        self.frame.gas = Gas::from_word(budget);
        let target = self.frame.storage_address;

        let result = self.run_frame();
        let gas_used = self.frame.gas.used();
        match result {
            Ok(output) => {
                let destroyed = self.frame.self_destruct;
                if destroyed {
                    let had_storage = self.state.remove_account(&target).is_some();
                    tracing::debug!(address = %target, had_storage, "account destroyed");
                }
                ExecutionResult {
                    destroyed,
                    ..ExecutionResult::success(gas_used, output, self.logs.into_records())
                }
            }
            Err(err) => ExecutionResult::failure(gas_used, err),
        }
    }

    /// Run `input` against the target with `budget`: return data, or the revert buffer
    pub fn invoke(self, input: impl Into<Bytes>, budget: &Word) -> Result<Bytes, Bytes> {
        self.execute(input, budget).into_result()
    }

    // ==================== Frame environment ====================

    /// Account whose storage this frame uses
    pub fn address(&self) -> Address {
        self.frame.storage_address
    }

    /// Account whose code is running
    pub fn code_address(&self) -> Address {
        self.frame.code_address
    }

    /// Immediate caller
    pub fn caller(&self) -> Address {
        self.frame.caller
    }

    /// Nesting level, 0 for the outermost frame
    pub fn depth(&self) -> usize {
        self.frame.depth
    }

    /// Whether writes are rejected
    pub fn is_static(&self) -> bool {
        self.frame.is_static
    }

    /// How the current frame was entered
    pub fn call_kind(&self) -> CallKind {
        self.frame.kind
    }

    /// Full input of the current frame, selector included
    pub fn input(&self) -> &Bytes {
        &self.frame.input
    }

    /// Budget left in the current frame
    pub fn gas_remaining(&self) -> u64 {
        self.frame.gas.remaining()
    }

    /// Charge `amount` to the current frame
    pub fn use_gas(&mut self, amount: u64) -> VmResult<()> {
        self.frame.gas.record_cost(amount)
    }

    /// Records emitted so far by this invocation and not rolled back
    pub fn logs(&self) -> &[LogRecord] {
        self.logs.records()
    }

    /// Limits in force
    pub fn config(&self) -> &VmConfig {
        self.config
    }

    // ==================== Storage ====================

    /// Read a slot of the current account
    pub fn sload(&mut self, slot: &Word) -> VmResult<Word> {
        self.frame.gas.record_cost(self.config.gas.sload)?;
        Ok(self.state.read(&self.frame.storage_address, slot))
    }

    /// Write a slot of the current account
    pub fn sstore(&mut self, slot: Word, value: Word) -> VmResult<()> {
        self.ensure_writable()?;
        let current = self.state.read(&self.frame.storage_address, &slot);
        self.frame
            .gas
            .record_cost(self.config.gas.sstore_gas(&current, &value))?;
        self.state.write(self.frame.storage_address, slot, value);
        Ok(())
    }

    /// Read a sub-word field of the current account
    pub fn sload_packed(&mut self, field: &PackedField) -> VmResult<Word> {
        self.frame.gas.record_cost(self.config.gas.sload)?;
        Ok(self.state.read_packed(&self.frame.storage_address, field))
    }

    /// Write a sub-word field as one read-modify-write of its slot.
    ///
    /// Bits of `value` above the field width are dropped.
    pub fn sstore_packed(&mut self, field: &PackedField, value: Word) -> VmResult<()> {
        self.ensure_writable()?;
        let current = self.state.read(&self.frame.storage_address, &field.slot());
        let updated = field.insert(current, value);
        self.frame
            .gas
            .record_cost(self.config.gas.sstore_gas(&current, &updated))?;
        self.state.write(self.frame.storage_address, field.slot(), updated);
        Ok(())
    }

    // ==================== Memory ====================

    /// Load a word from frame memory
    pub fn mload(&mut self, offset: &Word) -> VmResult<Word> {
        let frame = &mut self.frame;
        frame.memory.load(offset, &mut frame.gas)
    }

    /// Store a word to frame memory
    pub fn mstore(&mut self, offset: &Word, value: &Word) -> VmResult<()> {
        let frame = &mut self.frame;
        frame.memory.store(offset, value, &mut frame.gas)
    }

    /// Store one byte to frame memory
    pub fn mstore8(&mut self, offset: &Word, value: u8) -> VmResult<()> {
        let frame = &mut self.frame;
        frame.memory.store8(offset, value, &mut frame.gas)
    }

    /// High-water mark of frame memory
    pub fn msize(&self) -> Word {
        self.frame.memory.size()
    }

    /// Copy bytes out of frame memory
    pub fn mload_slice(&mut self, offset: &Word, size: usize) -> VmResult<Vec<u8>> {
        let frame = &mut self.frame;
        frame.memory.load_slice(offset, size, &mut frame.gas)
    }

    /// Copy bytes into frame memory
    pub fn mstore_slice(&mut self, offset: &Word, data: &[u8]) -> VmResult<()> {
        let frame = &mut self.frame;
        frame.memory.store_slice(offset, data, &mut frame.gas)
    }

    /// Copy within frame memory
    pub fn mcopy(&mut self, dest: &Word, src: &Word, size: usize) -> VmResult<()> {
        let frame = &mut self.frame;
        frame.memory.copy(dest, src, size, &mut frame.gas)
    }

    /// Keccak-256 of a memory range
    pub fn keccak(&mut self, offset: &Word, size: usize) -> VmResult<Word> {
        self.frame.gas.record_cost(self.config.gas.sha3_gas(size))?;
        let data = self.mload_slice(offset, size)?;
        Ok(keccak256(&data).to_word())
    }

    /// Return data taken from memory
    pub fn return_from_memory(&mut self, offset: &Word, size: usize) -> VmResult<Bytes> {
        self.mload_slice(offset, size).map(Bytes::from)
    }

    /// Revert with a buffer taken from memory.
    ///
    /// If reading the buffer itself fails, that failure is returned instead.
    pub fn revert_from_memory(&mut self, offset: &Word, size: usize) -> VmError {
        match self.mload_slice(offset, size) {
            Ok(data) => VmError::Revert(data.into()),
            Err(err) => err,
        }
    }

    // ==================== Logs ====================

    /// Emit a record from the current account
    pub fn emit(&mut self, topics: Vec<Word>, data: impl Into<Bytes>) -> VmResult<()> {
        self.ensure_writable()?;
        let record = LogRecord::new(self.frame.storage_address, topics, data)?;
        self.frame
            .gas
            .record_cost(self.config.gas.log_gas(record.topics.len(), record.data.len()))?;
        self.logs.emit(record);
        Ok(())
    }

    /// Emit a record whose data is a memory range
    pub fn emit_from_memory(&mut self, topics: Vec<Word>, offset: &Word, size: usize) -> VmResult<()> {
        self.ensure_writable()?;
        let data = self.mload_slice(offset, size)?;
        self.emit(topics, data)
    }

    // ==================== Calls ====================

    /// Call `target`, forwarding at most `gas`
    pub fn call(&mut self, target: Address, input: impl Into<Bytes>, gas: u64) -> VmResult<CallOutcome> {
        self.nested_call(CallKind::Call, target, input.into(), gas)
    }

    /// Call `target` read-only
    pub fn static_call(
        &mut self,
        target: Address,
        input: impl Into<Bytes>,
        gas: u64,
    ) -> VmResult<CallOutcome> {
        self.nested_call(CallKind::StaticCall, target, input.into(), gas)
    }

    /// Run `target`'s code against the current account's storage
    pub fn delegate_call(
        &mut self,
        target: Address,
        input: impl Into<Bytes>,
        gas: u64,
    ) -> VmResult<CallOutcome> {
        self.nested_call(CallKind::DelegateCall, target, input.into(), gas)
    }

    /// Mark the current account for removal.
    ///
    /// Only the outermost frame's mark counts, and only if the whole
    /// invocation succeeds.
    pub fn self_destruct(&mut self) -> VmResult<()> {
        self.ensure_writable()?;
        self.frame.gas.record_cost(self.config.gas.selfdestruct)?;
        self.frame.self_destruct = true;
        Ok(())
    }

    fn nested_call(
        &mut self,
        kind: CallKind,
        target: Address,
        input: Bytes,
        requested: u64,
    ) -> VmResult<CallOutcome> {
        self.frame.gas.record_cost(self.config.gas.call)?;

        let max = self.config.max_call_depth;
        if self.frame.depth >= max {
            tracing::warn!(depth = self.frame.depth, max, address = %target, "call depth exceeded");
            return Ok(CallOutcome::failed(VmError::CallDepthExceeded { max }, 0));
        }

        let forwarded = forwarded_gas(requested, self.frame.gas.remaining());
        let memory = MemoryArena::new(self.memory_policy.clone(), self.config.max_memory_bytes);
        let child = CallFrame::nested(&self.frame, kind, target, input, Gas::new(forwarded), memory);

        let parent = std::mem::replace(&mut self.frame, child);
        // handlers recurse through here on the native stack
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.run_frame());
        let child = std::mem::replace(&mut self.frame, parent);

        let gas_used = child.gas.used();
        self.frame.gas.record_cost(gas_used)?;
        Ok(match result {
            Ok(output) => CallOutcome::returned(output, gas_used),
            Err(err) => CallOutcome::failed(err, gas_used),
        })
    }

    /// Run the active frame to a terminal state, rolling its effects back on failure
    fn run_frame(&mut self) -> VmResult<Bytes> {
        let checkpoint = self.state.checkpoint();
        let log_mark = self.logs.mark();
        tracing::debug!(
            address = %self.frame.code_address,
            depth = self.frame.depth,
            input_len = self.frame.input.len(),
            gas = self.frame.gas.limit(),
            "frame entered"
        );

        let result = match self.dispatch() {
            Ok(output) => self
                .state
                .commit(checkpoint)
                .map_err(VmError::from)
                .and_then(|()| self.frame.advance(FrameState::Returned))
                .map(|()| output),
            Err(err) => {
                self.logs.truncate(log_mark);
                self.frame.self_destruct = false;
                if !err.is_revert() {
                    self.frame.gas.consume_all();
                }
                let rollback = self.state.revert_to(checkpoint);
                self.frame.state = FrameState::Reverted;
                match rollback {
                    Ok(()) => Err(err),
                    Err(fault) => Err(fault.into()),
                }
            }
        };

        tracing::debug!(
            address = %self.frame.code_address,
            depth = self.frame.depth,
            state = %self.frame.state,
            gas_used = self.frame.gas.used(),
            "frame exited"
        );
        result
    }

    fn dispatch(&mut self) -> VmResult<Bytes> {
        let registry = self.registry;
        let Some(dispatcher) = registry.get(&self.frame.code_address) else {
            // plain account: nothing to run
            self.frame.advance(FrameState::Decoding)?;
            self.frame.advance(FrameState::Executing)?;
            return Ok(Bytes::new());
        };

        let selector = self.frame.decode_selector()?;
        let input = self.frame.input.clone();
        let (handler, args) = dispatcher.resolve(selector, &input)?;
        self.frame.advance(FrameState::Executing)?;
        handler(self, args)
    }

    fn ensure_writable(&self) -> VmResult<()> {
        if self.frame.is_static {
            return Err(VmError::StaticCallViolation);
        }
        Ok(())
    }
}
