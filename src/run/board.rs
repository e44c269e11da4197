// src/run/board.rs

//! Pure run-state bookkeeping.
//!
//! [`RunBoard`] tracks every task of one run and applies state transitions
//! handed to it by the engine core. It performs no IO and spawns nothing,
//! which keeps the transition rules testable without a runtime.
//!
//! Readiness gate: a queued task may start once its start offset has
//! elapsed *and* its dependency, if any, is terminal. Terminal includes
//! `Error`: a failed dependency unblocks its dependents rather than
//! wedging the run.

use std::collections::HashMap;
use std::time::Duration;

use crate::plan::TaskPlan;
use crate::run::snapshot::RunSnapshot;
use crate::run::task_state::{TaskOutcome, TaskState, TaskStatus};
use crate::types::TaskName;

#[derive(Debug)]
struct TaskEntry {
    state: TaskState,
    depends_on: Option<TaskName>,
    offset_elapsed: bool,
    progress_lines: Vec<String>,
    next_line: usize,
}

/// State of all tasks in one run, keyed by task name.
///
/// Plan order is preserved for snapshots.
#[derive(Debug)]
pub struct RunBoard {
    entries: HashMap<TaskName, TaskEntry>,
    order: Vec<TaskName>,
}

impl RunBoard {
    pub fn from_plan<R>(plan: &TaskPlan<R>) -> Self {
        let mut entries = HashMap::with_capacity(plan.len());
        let mut order = Vec::with_capacity(plan.len());
        for spec in &plan.tasks {
            order.push(spec.name.clone());
            entries.insert(
                spec.name.clone(),
                TaskEntry {
                    state: TaskState::queued(spec.name.clone()),
                    depends_on: spec.depends_on.clone(),
                    offset_elapsed: spec.start_offset.is_zero(),
                    progress_lines: spec.progress_lines.clone(),
                    next_line: 0,
                },
            );
        }
        Self { entries, order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn state(&self, name: &str) -> Option<&TaskState> {
        self.entries.get(name).map(|e| &e.state)
    }

    /// Record that `name`'s start offset has elapsed. Returns `false` for an
    /// unknown task or an offset that was already marked.
    pub fn mark_offset_elapsed(&mut self, name: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) if !entry.offset_elapsed => {
                entry.offset_elapsed = true;
                true
            }
            _ => false,
        }
    }

    /// Names of all queued tasks whose readiness gate is open, in plan
    /// order.
    pub fn ready_tasks(&self) -> Vec<TaskName> {
        self.order
            .iter()
            .filter(|name| {
                let Some(entry) = self.entries.get(name.as_str()) else {
                    return false;
                };
                entry.state.status == TaskStatus::Queued
                    && entry.offset_elapsed
                    && self.dependency_open(entry)
            })
            .cloned()
            .collect()
    }

    fn dependency_open(&self, entry: &TaskEntry) -> bool {
        match &entry.depends_on {
            None => true,
            Some(dep) => self
                .entries
                .get(dep.as_str())
                .is_some_and(|d| d.state.is_terminal()),
        }
    }

    /// Transition `name` from queued to working at run-elapsed time
    /// `elapsed`, seeding the first progress line if the task has any.
    /// Returns `false` if the task is unknown or not queued.
    pub fn mark_working(&mut self, name: &str, elapsed: Duration) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if entry.state.status != TaskStatus::Queued {
            return false;
        }
        entry.state.status = TaskStatus::Working;
        entry.state.started_at = Some(elapsed);
        if let Some(first) = entry.progress_lines.first() {
            entry.state.progress_text = Some(first.clone());
            entry.next_line = 1 % entry.progress_lines.len();
        }
        true
    }

    /// Rotate the task's progress text to the next line in its cycle.
    /// A tick that lands after the task went terminal is ignored.
    pub fn advance_progress(&mut self, name: &str) {
        let Some(entry) = self.entries.get_mut(name) else {
            return;
        };
        if entry.state.status != TaskStatus::Working || entry.progress_lines.is_empty() {
            return;
        }
        entry.state.progress_text = Some(entry.progress_lines[entry.next_line].clone());
        entry.next_line = (entry.next_line + 1) % entry.progress_lines.len();
    }

    /// Transition `name` to its terminal state at run-elapsed time
    /// `elapsed`. Progress text is cleared; the outcome's summary or error
    /// takes its place on the state. Returns `false` if the task is unknown
    /// or already terminal.
    pub fn finish(&mut self, name: &str, outcome: TaskOutcome, elapsed: Duration) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if entry.state.is_terminal() {
            return false;
        }
        match outcome {
            TaskOutcome::Completed { summary } => {
                entry.state.status = TaskStatus::Complete;
                entry.state.result_summary = summary;
            }
            TaskOutcome::Failed { error } => {
                entry.state.status = TaskStatus::Error;
                entry.state.error = Some(error);
            }
        }
        entry.state.progress_text = None;
        entry.state.completed_at = Some(elapsed);
        true
    }

    pub fn all_terminal(&self) -> bool {
        self.entries.values().all(|e| e.state.is_terminal())
    }

    /// Clone the current task states, in plan order.
    pub fn snapshot(&self, settled: bool) -> RunSnapshot {
        let tasks = self
            .order
            .iter()
            .filter_map(|name| self.entries.get(name.as_str()))
            .map(|e| e.state.clone())
            .collect();
        RunSnapshot { tasks, settled }
    }
}
