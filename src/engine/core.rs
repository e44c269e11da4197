// src/engine/core.rs

//! Pure core state machine of a run.
//!
//! This module contains a synchronous, deterministic "run core" that
//! consumes [`EngineEvent`]s and produces:
//! - updated task states on the run board
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::EngineRuntime`) is
//! responsible for:
//! - reading events from channels
//! - spawning workers, offset timers and progress reporters
//! - publishing snapshots to observers
//!
//! The core has no channels, no Tokio types, and no clock of its own: the
//! shell passes the run-elapsed time in with each event. This keeps every
//! transition rule unit-testable without a runtime.

use std::time::Duration;

use crate::engine::event_handlers::{
    handle_abandoned, handle_offset_elapsed, handle_progress_tick, handle_run_started,
    handle_task_finished, CoreStep,
};
use crate::engine::EngineEvent;
use crate::run::{RunBoard, RunSnapshot, TaskState};

/// Pure run-core state.
///
/// Owns the run board and nothing else; all IO lives in the shell.
#[derive(Debug)]
pub struct RunCore {
    board: RunBoard,
}

impl RunCore {
    pub fn new(board: RunBoard) -> Self {
        Self { board }
    }

    pub fn task_count(&self) -> usize {
        self.board.len()
    }

    /// Whether every task has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.board.all_terminal()
    }

    pub fn task_state(&self, name: &str) -> Option<&TaskState> {
        self.board.state(name)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.board.snapshot(self.is_settled())
    }

    /// Dispatch everything that is ready the moment the run begins.
    ///
    /// For an empty plan this settles immediately: the returned step carries
    /// no commands and `keep_running` is false.
    pub fn start(&mut self) -> CoreStep {
        handle_run_started(&mut self.board)
    }

    /// Handle a single engine event at run-elapsed time `elapsed`, updating
    /// the board and returning the resulting commands for the IO shell.
    pub fn step(&mut self, event: EngineEvent, elapsed: Duration) -> CoreStep {
        match event {
            EngineEvent::OffsetElapsed { task } => {
                handle_offset_elapsed(&mut self.board, task, elapsed)
            }
            EngineEvent::ProgressTick { task } => handle_progress_tick(&mut self.board, task),
            EngineEvent::TaskFinished { task, outcome } => {
                handle_task_finished(&mut self.board, task, outcome, elapsed)
            }
            EngineEvent::Abandoned => handle_abandoned(),
        }
    }
}
