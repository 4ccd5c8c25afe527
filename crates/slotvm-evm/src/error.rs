//! Execution error and result types

use crate::log::LogRecord;
use bytes::Bytes;
use slotvm_primitives::Selector;
use slotvm_storage::StorageError;
use thiserror::Error;

/// Execution errors.
///
/// Every variant aborts the frame it occurs in and rolls back that frame's
/// storage writes and logs. None of them is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    /// Input shorter than a selector
    #[error("malformed input: {len} bytes, selector needs 4")]
    MalformedInput {
        /// Input length in bytes
        len: usize,
    },

    /// No handler for the selector and no fallback
    #[error("unknown selector: {0}")]
    UnknownSelector(Selector),

    /// Budget exhausted during memory growth, storage access, logging or a call
    #[error("out of resource")]
    OutOfResource,

    /// Nested call would exceed the call-depth limit
    #[error("call depth exceeded (max {max})")]
    CallDepthExceeded {
        /// Configured limit
        max: usize,
    },

    /// Handler-requested abort carrying a message buffer
    #[error("execution reverted")]
    Revert(Bytes),

    /// Write in static context
    #[error("state modification in static context")]
    StaticCallViolation,

    /// Internal invariant violation
    #[error("handler fault: {0}")]
    HandlerFault(String),
}

impl VmError {
    /// Explicit revert with `data`
    pub fn revert(data: impl Into<Bytes>) -> Self {
        VmError::Revert(data.into())
    }

    /// Whether this is an explicit revert
    pub fn is_revert(&self) -> bool {
        matches!(self, VmError::Revert(_))
    }

    /// Bytes surfaced to the caller: the revert buffer, or nothing
    pub fn output(&self) -> Bytes {
        match self {
            VmError::Revert(data) => data.clone(),
            _ => Bytes::new(),
        }
    }
}

impl From<StorageError> for VmError {
    fn from(err: StorageError) -> Self {
        VmError::HandlerFault(err.to_string())
    }
}

/// Result type for execution operations
pub type VmResult<T> = Result<T, VmError>;

/// Outcome of one top-level invocation
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Gas used
    pub gas_used: u64,
    /// Return data (or revert data)
    pub output: Bytes,
    /// Logs emitted; empty unless `success`
    pub logs: Vec<LogRecord>,
    /// Why execution failed
    pub error: Option<VmError>,
    /// Target account was removed by self-destruct
    pub destroyed: bool,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(gas_used: u64, output: Bytes, logs: Vec<LogRecord>) -> Self {
        Self {
            success: true,
            gas_used,
            output,
            logs,
            error: None,
            destroyed: false,
        }
    }

    /// Create a failed result
    pub fn failure(gas_used: u64, error: VmError) -> Self {
        Self {
            success: false,
            gas_used,
            output: error.output(),
            logs: Vec::new(),
            error: Some(error),
            destroyed: false,
        }
    }

    /// Output on success, revert buffer on failure
    pub fn into_result(self) -> Result<Bytes, Bytes> {
        if self.success {
            Ok(self.output)
        } else {
            Err(self.output)
        }
    }
}
