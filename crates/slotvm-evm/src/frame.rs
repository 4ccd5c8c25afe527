//! Call frames and their lifecycle

use crate::error::{VmError, VmResult};
use crate::gas::Gas;
use crate::memory::MemoryArena;
use bytes::Bytes;
use slotvm_primitives::{Address, Selector};
use std::fmt;

/// Lifecycle of a frame.
///
/// `Pending -> Decoding -> Executing -> {Returned, Reverted}`. A frame can
/// also drop straight to `Reverted` from `Pending` (input too short) or
/// `Decoding` (no handler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Created, input not looked at yet
    Pending,
    /// Selector extracted, handler lookup in progress
    Decoding,
    /// Handler running
    Executing,
    /// Completed; effects kept
    Returned,
    /// Aborted; effects discarded
    Reverted,
}

impl FrameState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, FrameState::Returned | FrameState::Reverted)
    }

    /// Whether `self -> next` is a legal step
    pub fn can_transition_to(&self, next: FrameState) -> bool {
        use FrameState::*;
        matches!(
            (self, next),
            (Pending, Decoding)
                | (Pending, Reverted)
                | (Decoding, Executing)
                | (Decoding, Reverted)
                | (Executing, Returned)
                | (Executing, Reverted)
        )
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameState::Pending => "pending",
            FrameState::Decoding => "decoding",
            FrameState::Executing => "executing",
            FrameState::Returned => "returned",
            FrameState::Reverted => "reverted",
        };
        f.write_str(name)
    }
}

/// How a nested frame was entered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// Regular call: target code on target storage
    Call,
    /// Read-only call: writes, logs and self-destruct are rejected
    StaticCall,
    /// Target code on the caller's storage, keeping the caller's caller
    DelegateCall,
}

/// One handler execution with its own memory and budget
#[derive(Debug)]
pub struct CallFrame {
    pub(crate) kind: CallKind,
    /// Account whose dispatcher runs
    pub(crate) code_address: Address,
    /// Account whose storage is read and written
    pub(crate) storage_address: Address,
    pub(crate) caller: Address,
    pub(crate) input: Bytes,
    pub(crate) depth: usize,
    pub(crate) is_static: bool,
    pub(crate) state: FrameState,
    pub(crate) memory: MemoryArena,
    pub(crate) gas: Gas,
    pub(crate) self_destruct: bool,
}

impl CallFrame {
    /// Outermost frame calling `target` on behalf of `caller`
    pub fn root(caller: Address, target: Address, memory: MemoryArena) -> Self {
        Self {
            kind: CallKind::Call,
            code_address: target,
            storage_address: target,
            caller,
            input: Bytes::new(),
            depth: 0,
            is_static: false,
            state: FrameState::Pending,
            memory,
            gas: Gas::new(0),
            self_destruct: false,
        }
    }

    /// Frame for a nested call of `kind` made from `parent` towards `target`
    pub fn nested(
        parent: &CallFrame,
        kind: CallKind,
        target: Address,
        input: Bytes,
        gas: Gas,
        memory: MemoryArena,
    ) -> Self {
        let (storage_address, caller, is_static) = match kind {
            CallKind::Call => (target, parent.storage_address, parent.is_static),
            CallKind::StaticCall => (target, parent.storage_address, true),
            CallKind::DelegateCall => (parent.storage_address, parent.caller, parent.is_static),
        };
        Self {
            kind,
            code_address: target,
            storage_address,
            caller,
            input,
            depth: parent.depth + 1,
            is_static,
            state: FrameState::Pending,
            memory,
            gas,
            self_destruct: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// How the frame was entered
    pub fn kind(&self) -> CallKind {
        self.kind
    }

    /// Nesting level, 0 for the outermost frame
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Move to `next`, rejecting illegal steps as a fault
    pub fn advance(&mut self, next: FrameState) -> VmResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(VmError::HandlerFault(format!(
                "illegal frame transition {} -> {}",
                self.state, next
            )));
        }
        tracing::trace!(depth = self.depth, from = %self.state, to = %next, "frame transition");
        self.state = next;
        Ok(())
    }

    /// Extract the selector and enter `Decoding`.
    ///
    /// Input shorter than a selector is `MalformedInput`; the frame stays
    /// `Pending` so the caller can revert it directly.
    pub fn decode_selector(&mut self) -> VmResult<Selector> {
        let malformed = VmError::MalformedInput {
            len: self.input.len(),
        };
        if self.input.len() < Selector::LEN {
            return Err(malformed);
        }
        let selector =
            Selector::from_slice(&self.input[..Selector::LEN]).map_err(|_| malformed)?;
        self.advance(FrameState::Decoding)?;
        Ok(selector)
    }
}
