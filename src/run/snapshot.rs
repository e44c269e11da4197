// src/run/snapshot.rs

//! Point-in-time view of a run.

use serde::Serialize;

use crate::run::task_state::{TaskState, TaskStatus};

/// Immutable copy of every task state in a run, in plan order.
///
/// `settled` is true once all tasks are terminal; a settled snapshot never
/// transitions back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub tasks: Vec<TaskState>,
    pub settled: bool,
}

impl RunSnapshot {
    pub fn task(&self, name: &str) -> Option<&TaskState> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Number of tasks that finished successfully.
    pub fn completed(&self) -> usize {
        self.count(TaskStatus::Complete)
    }

    /// Number of tasks that reached the error state.
    pub fn errored(&self) -> usize {
        self.count(TaskStatus::Error)
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}
