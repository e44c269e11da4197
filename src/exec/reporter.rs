// src/exec/reporter.rs

//! Per-task progress reporter.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::engine::EngineEvent;
use crate::types::TaskName;

/// Spawn the progress reporter for a single working task.
///
/// Emits a `ProgressTick` every `period` until cancelled. A task shows its
/// first progress line from the moment it starts working, so the first
/// rotation fires one full period after dispatch, not immediately.
pub fn spawn_reporter(
    task: TaskName,
    period: Duration,
    events: mpsc::UnboundedSender<EngineEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // interval's first tick resolves immediately; consume it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if events
                        .send(EngineEvent::ProgressTick { task: task.clone() })
                        .is_err()
                    {
                        debug!(task = %task, "run loop gone; reporter stopping");
                        break;
                    }
                }
                cancel = &mut cancel_rx => {
                    match cancel {
                        Ok(()) => debug!(task = %task, "reporter stopped"),
                        Err(_) => {
                            debug!(task = %task, "run loop gone; reporter stopping");
                        }
                    }
                    break;
                }
            }
        }
    })
}
