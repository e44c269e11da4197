// src/engine/mod.rs

//! Orchestration engine for genflow.
//!
//! This module ties together:
//! - the run board that tracks per-task state
//! - the readiness gate (start offsets and dependency completion)
//! - the main run loop that reacts to:
//!   - start-offset timers firing
//!   - progress-reporter ticks
//!   - worker completion events
//!   - abandonment of the run handle
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`], and the caller-facing handle in [`handle`].

use std::time::Duration;

use crate::run::TaskOutcome;
use crate::types::TaskName;

/// Default period between progress-line rotations.
pub const DEFAULT_PROGRESS_PERIOD: Duration = Duration::from_millis(2500);

/// Options for one run, shared by the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Period between progress-line rotations for tasks that declare
    /// progress lines.
    pub progress_period: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            progress_period: DEFAULT_PROGRESS_PERIOD,
        }
    }
}

/// Events flowing into the run loop from timers, workers and the handle.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A task's start offset has elapsed.
    OffsetElapsed { task: TaskName },
    /// A task's progress reporter ticked.
    ProgressTick { task: TaskName },
    /// A task's worker finished with a terminal outcome.
    TaskFinished { task: TaskName, outcome: TaskOutcome },
    /// The run handle was dropped; nobody is observing this run any more.
    Abandoned,
}

pub mod core;
pub mod event_handlers;
pub mod handle;
pub mod runtime;

pub use core::RunCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use handle::RunHandle;
pub use runtime::Engine;
