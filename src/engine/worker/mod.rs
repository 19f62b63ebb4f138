//! Per-task worker -- the task state machine.
//!
//! Split into focused submodules:
//! - [`context`] - Shared state and store helpers for one worker
//! - [`orchestration`] - The processing loop and link downloads
//! - [`finalization`] - Terminal classification and archiving

mod context;
mod finalization;
mod orchestration;

pub(crate) use context::TaskContext;
pub(crate) use orchestration::run_task;
