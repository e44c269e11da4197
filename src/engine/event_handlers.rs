// src/engine/event_handlers.rs

//! Event handling logic for the run core.

use std::time::Duration;

use crate::run::{RunBoard, TaskOutcome};
use crate::types::TaskName;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Spawn workers (and reporters, where declared) for these tasks.
    DispatchTasks(Vec<TaskName>),
    /// Stop the progress reporter of a task that went terminal.
    StopReporter(TaskName),
    /// Stop every live reporter; the run is over.
    StopAllReporters,
}

/// Decision returned by the core after handling a single `EngineEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute (spawn workers, stop reporters).
    pub commands: Vec<CoreCommand>,
    /// Whether the outer run loop should keep running.
    pub keep_running: bool,
}

/// Initial sweep at run start.
///
/// Dispatches every task whose gate is already open: zero start offset and
/// no dependency (or a dependency that cannot exist, which validation rules
/// out). Tasks with a pending offset or dependency stay queued until the
/// corresponding events arrive.
pub fn handle_run_started(board: &mut RunBoard) -> CoreStep {
    CoreStep {
        commands: dispatch_ready(board, Duration::ZERO),
        keep_running: !board.all_terminal(),
    }
}

/// Handle a start-offset timer firing.
///
/// Marks the offset as elapsed and dispatches whatever became ready. The
/// offset gate is one of two conditions; a task whose dependency is still
/// running stays queued here and is picked up by the completion handler
/// later.
pub fn handle_offset_elapsed(board: &mut RunBoard, task: TaskName, elapsed: Duration) -> CoreStep {
    board.mark_offset_elapsed(&task);

    CoreStep {
        commands: dispatch_ready(board, elapsed),
        keep_running: true,
    }
}

/// Handle a progress-reporter tick.
///
/// Rotates the task's progress line. A tick racing a completion (the
/// reporter fired before its stop arrived) lands on a terminal task and is
/// ignored by the board.
pub fn handle_progress_tick(board: &mut RunBoard, task: TaskName) -> CoreStep {
    board.advance_progress(&task);

    CoreStep {
        commands: Vec::new(),
        keep_running: true,
    }
}

/// Handle a worker reporting its terminal outcome.
///
/// Applies the transition, stops the task's reporter, and dispatches any
/// dependents the transition unblocked. Failure unblocks just like success;
/// dependents observe the shared result object as the failed task left it.
/// The run loop stops once every task is terminal.
pub fn handle_task_finished(
    board: &mut RunBoard,
    task: TaskName,
    outcome: TaskOutcome,
    elapsed: Duration,
) -> CoreStep {
    let mut commands = Vec::new();

    if board.finish(&task, outcome, elapsed) {
        commands.push(CoreCommand::StopReporter(task));
        commands.extend(dispatch_ready(board, elapsed));
    }

    CoreStep {
        keep_running: !board.all_terminal(),
        commands,
    }
}

/// Handle abandonment of the run handle.
///
/// Only observation stops: reporters are cancelled and the loop exits.
/// In-flight workers keep running to completion; their completion events
/// simply have nowhere to go.
pub fn handle_abandoned() -> CoreStep {
    CoreStep {
        commands: vec![CoreCommand::StopAllReporters],
        keep_running: false,
    }
}

/// Move every ready task to working and emit a dispatch command for the
/// batch. Transitions happen here so a task can never be collected as ready
/// twice.
fn dispatch_ready(board: &mut RunBoard, elapsed: Duration) -> Vec<CoreCommand> {
    let ready = board.ready_tasks();
    if ready.is_empty() {
        return Vec::new();
    }

    for name in &ready {
        board.mark_working(name, elapsed);
    }

    vec![CoreCommand::DispatchTasks(ready)]
}
