// src/exec/worker.rs

//! Individual task worker.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::engine::EngineEvent;
use crate::merge::SharedDoc;
use crate::plan::{TaskContext, WorkFn, WorkOutput};
use crate::run::TaskOutcome;
use crate::types::{EmptyResultPolicy, TaskName};

/// Spawn the worker for a single dispatched task.
///
/// The worker invokes the task's work routine, applies the declared
/// empty-result policy to what comes back, folds an accepted patch into the
/// shared result object, and reports the terminal outcome to the run loop.
/// If the loop is gone (the run was abandoned), the report is dropped
/// silently; the work itself has already run to completion by then.
pub fn spawn_worker<R: Send + 'static>(
    task: TaskName,
    work: WorkFn<R>,
    on_empty: EmptyResultPolicy,
    doc: SharedDoc<R>,
    events: mpsc::UnboundedSender<EngineEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = run_work(&task, &work, on_empty, &doc).await;
        let _ = events.send(EngineEvent::TaskFinished { task, outcome });
    })
}

/// Run the work routine to a terminal outcome.
///
/// The empty-result policy only applies to a routine that *succeeds* with a
/// zero item count. An error from any invocation, including the retry,
/// fails the task with that error and is never itself retried.
async fn run_work<R>(
    task: &str,
    work: &WorkFn<R>,
    on_empty: EmptyResultPolicy,
    doc: &SharedDoc<R>,
) -> TaskOutcome {
    info!(task = %task, "task starting");

    let output = match invoke(task, work, 1, doc).await {
        Ok(output) => output,
        Err(err) => return failed(task, &err),
    };

    if !output.is_declared_empty() {
        return accept(task, output, doc);
    }

    match on_empty {
        EmptyResultPolicy::Accept => accept(task, output, doc),
        EmptyResultPolicy::Fail => {
            error!(task = %task, "task produced no items");
            TaskOutcome::Failed {
                error: "produced no items".to_string(),
            }
        }
        EmptyResultPolicy::RetryOnce => {
            warn!(task = %task, "task produced no items; retrying once");
            let second = match invoke(task, work, 2, doc).await {
                Ok(output) => output,
                Err(err) => return failed(task, &err),
            };
            if second.is_declared_empty() {
                error!(task = %task, "task produced no items after retry");
                TaskOutcome::Failed {
                    error: "produced no items after retry".to_string(),
                }
            } else {
                accept(task, second, doc)
            }
        }
    }
}

async fn invoke<R>(
    task: &str,
    work: &WorkFn<R>,
    attempt: u32,
    doc: &SharedDoc<R>,
) -> anyhow::Result<WorkOutput<R>> {
    let ctx = TaskContext {
        task: task.to_string(),
        attempt,
        doc: doc.clone(),
    };
    (work)(ctx).await
}

fn accept<R>(task: &str, output: WorkOutput<R>, doc: &SharedDoc<R>) -> TaskOutcome {
    let WorkOutput {
        patch,
        item_count,
        summary,
    } = output;

    if let Some(patch) = patch {
        doc.apply(patch);
    }

    info!(task = %task, items = ?item_count, "task completed");
    TaskOutcome::Completed { summary }
}

fn failed(task: &str, err: &anyhow::Error) -> TaskOutcome {
    let error = format!("{err:#}");
    error!(task = %task, error = %error, "task failed");
    TaskOutcome::Failed { error }
}
