// src/engine/handle.rs

//! Caller-facing handle onto a running run.

use std::fmt;

use tokio::sync::{mpsc, watch};

use crate::merge::SharedDoc;
use crate::run::RunSnapshot;

use super::EngineEvent;

/// Observes one run and owns its lifetime from the caller's side.
///
/// The handle never blocks the run: workers proceed whether or not anyone
/// looks at a snapshot. Dropping the handle abandons observation; reporters
/// stop, the run loop exits, and in-flight work completes unobserved.
/// Abandonment is detachment, not cancellation: dispatched work cannot be
/// interrupted through the handle.
pub struct RunHandle<R> {
    events: mpsc::UnboundedSender<EngineEvent>,
    snapshots: watch::Receiver<RunSnapshot>,
    doc: SharedDoc<R>,
}

impl<R> RunHandle<R> {
    pub(crate) fn new(
        events: mpsc::UnboundedSender<EngineEvent>,
        snapshots: watch::Receiver<RunSnapshot>,
        doc: SharedDoc<R>,
    ) -> Self {
        Self {
            events,
            snapshots,
            doc,
        }
    }

    /// Current state of every task, in plan order.
    pub fn snapshot(&self) -> RunSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Whether every task has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.snapshots.borrow().settled
    }

    /// The shared result object this run writes into.
    pub fn doc(&self) -> &SharedDoc<R> {
        &self.doc
    }

    /// A fresh receiver onto the snapshot stream, for observers running
    /// beside this handle. Subscriptions go quiet once the handle that owns
    /// the run is dropped.
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the next state change and return the new snapshot, or
    /// `None` once no further changes can arrive.
    pub async fn changed(&mut self) -> Option<RunSnapshot> {
        match self.snapshots.changed().await {
            Ok(()) => Some(self.snapshots.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// Wait until the run settles.
    ///
    /// All failures are tolerated: this resolves `true` once every task is
    /// terminal, however many of them errored. Resolves `false` only if the
    /// run loop went away before settling.
    pub async fn wait_settled(&mut self) -> bool {
        loop {
            if self.snapshots.borrow_and_update().settled {
                return true;
            }
            if self.snapshots.changed().await.is_err() {
                return self.snapshots.borrow().settled;
            }
        }
    }

    /// Stop observing the run. Equivalent to dropping the handle.
    pub fn abandon(self) {}
}

impl<R> fmt::Debug for RunHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}

impl<R> Drop for RunHandle<R> {
    fn drop(&mut self) {
        // Harmless after settling; the run loop has already exited and the
        // send just fails.
        let _ = self.events.send(EngineEvent::Abandoned);
    }
}
