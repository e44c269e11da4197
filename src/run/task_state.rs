// src/run/task_state.rs

//! Per-task observable state.

use std::time::Duration;

use serde::Serialize;

use crate::types::TaskName;

/// Lifecycle phase of a task within a run.
///
/// Transitions are monotonic: `Queued -> Working -> (Complete | Error)`.
/// A terminal status is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Working,
    Complete,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Error)
    }
}

/// Terminal result of a task's work, as reported by its worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The work routine finished and its output was accepted.
    Completed { summary: Option<String> },
    /// The work routine failed, or its empty output was rejected by policy.
    Failed { error: String },
}

/// Snapshot-able state of one task.
///
/// `progress_text` is only populated while the task is working; on a
/// terminal transition it is cleared in favour of `result_summary` or
/// `error`. Timestamps are run-elapsed durations, not wall-clock instants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskState {
    pub name: TaskName,
    pub status: TaskStatus,
    pub progress_text: Option<String>,
    pub result_summary: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<Duration>,
    pub completed_at: Option<Duration>,
}

impl TaskState {
    pub(crate) fn queued(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Queued,
            progress_text: None,
            result_summary: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
