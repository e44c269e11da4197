// src/run/mod.rs

//! Run-state layer.
//!
//! - [`task_state`] defines the per-task status machine and observable state.
//! - [`board`] applies transitions across all tasks of a run and answers
//!   readiness queries.
//! - [`snapshot`] is the cloned, serialisable view handed to observers.

pub mod board;
pub mod snapshot;
pub mod task_state;

pub use board::RunBoard;
pub use snapshot::RunSnapshot;
pub use task_state::{TaskOutcome, TaskState, TaskStatus};
