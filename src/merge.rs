// src/merge.rs

//! The shared result object and the update discipline around it.
//!
//! One run owns a single mutable aggregate (for the coursework wizard: the
//! best-known generated output so far). Primary tasks and unawaited
//! sub-tasks (e.g. one image render per generated slide) all write into it,
//! in whatever order they happen to finish. Every write therefore has to be
//! a read-modify-write against the value as it is *at the moment of the
//! write*; writing back a clone captured earlier silently drops whichever
//! updates landed in between.
//!
//! [`SharedDoc`] enforces that shape: the only write path is
//! [`SharedDoc::apply`], which locks the current value and hands out a
//! mutable borrow. Deferred updates go through [`SharedDoc::spawn_update`],
//! which runs a producer future on its own tokio task and applies (or, on
//! failure, logs and drops) its patch.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

/// A deferred update to the shared result object, expressed as a function of
/// its current value.
pub type DocPatch<R> = Box<dyn FnOnce(&mut R) + Send + 'static>;

/// Box a closure as a [`DocPatch`].
pub fn patch<R>(f: impl FnOnce(&mut R) + Send + 'static) -> DocPatch<R> {
    Box::new(f)
}

/// Handle to the shared result object of one run.
///
/// Cheap to clone; all clones address the same underlying value. Work
/// routines receive one through their task context, the engine keeps one for
/// primary-completion patches, and the run handle keeps one for observer
/// snapshots.
pub struct SharedDoc<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> Clone for SharedDoc<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for SharedDoc<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDoc").finish_non_exhaustive()
    }
}

impl<R> SharedDoc<R> {
    pub fn new(initial: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Apply a read-modify-write patch against the current value.
    ///
    /// Patches run under the lock and must not block or await; they are
    /// plain data edits (set a field, push an item, fill a slot).
    pub fn apply(&self, patch: impl FnOnce(&mut R)) {
        // A panicking patch must not wedge every later write.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        patch(&mut guard);
    }

    /// Read through the lock without cloning the whole value.
    pub fn read<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Clone the current value as a point-in-time snapshot.
    pub fn snapshot(&self) -> R
    where
        R: Clone,
    {
        self.read(|doc| doc.clone())
    }

    /// Dispatch a deferred update that nothing waits on.
    ///
    /// `produce` runs on its own tokio task. On success its patch is applied
    /// like any other write; on failure the error is logged against `label`
    /// and the result object is left without that item's enhancement. A
    /// failed enhancement never fails the task that requested it.
    ///
    /// The returned handle can be awaited (tests do), but the engine never
    /// does: these updates may land before or after the originating task is
    /// recorded as finished, or after the run has settled.
    pub fn spawn_update<F>(
        &self,
        label: impl Into<String>,
        produce: F,
    ) -> tokio::task::JoinHandle<()>
    where
        R: Send + 'static,
        F: Future<Output = anyhow::Result<DocPatch<R>>> + Send + 'static,
    {
        let doc = self.clone();
        let label = label.into();

        tokio::spawn(async move {
            match produce.await {
                Ok(patch) => {
                    doc.apply(patch);
                    debug!(item = %label, "deferred update applied");
                }
                Err(err) => {
                    warn!(
                        item = %label,
                        error = %format!("{err:#}"),
                        "deferred update failed; leaving item as-is"
                    );
                }
            }
        })
    }
}
