//! # slotvm-evm
//!
//! Deterministic execution core for slotvm.
//!
//! This crate provides:
//! - Frame-local memory with priced, monotonic growth
//! - Selector dispatch into registered handlers
//! - Nested calls with transitive rollback of storage and logs
//! - Gas metering and configurable limits

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod context;
mod dispatch;
mod error;
mod executor;
mod frame;
pub mod gas;
mod log;
mod memory;

pub use config::VmConfig;
pub use context::{CallOutcome, ExecutionContext};
pub use dispatch::{ContractRegistry, Dispatcher, Handler, HandlerResult};
pub use error::{ExecutionResult, VmError, VmResult};
pub use executor::{Executor, Message};
pub use frame::{CallFrame, CallKind, FrameState};
pub use gas::{Gas, GasSchedule, MemoryCostPolicy, QuadraticMemoryCost};
pub use log::{LogRecord, LogSink, MAX_TOPICS};
pub use memory::MemoryArena;
