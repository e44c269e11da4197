// src/plan/spec.rs

//! Task descriptions: what to run, when it may start, and how its output is
//! judged.
//!
//! A [`TaskSpec`] is immutable once its plan is constructed. The work routine
//! it carries is an opaque async closure supplied by the caller; the engine
//! invokes it, applies the declared empty-result policy to what comes back,
//! and never looks inside the task-specific logic.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::merge::{DocPatch, SharedDoc};
use crate::types::{EmptyResultPolicy, TaskName};

/// Boxed future returned by a work routine.
pub type WorkFuture<R> = Pin<Box<dyn Future<Output = anyhow::Result<WorkOutput<R>>> + Send>>;

/// Type-erased work routine.
///
/// `Fn` rather than `FnOnce` so the engine can invoke it a second time under
/// the retry-once policy; inputs beyond the [`TaskContext`] are whatever the
/// caller closed over.
pub type WorkFn<R> = Arc<dyn Fn(TaskContext<R>) -> WorkFuture<R> + Send + Sync>;

/// What a work routine sees when it is invoked.
pub struct TaskContext<R> {
    /// Name of the task being run.
    pub task: TaskName,
    /// 1-based invocation number; 2 on the empty-result retry.
    pub attempt: u32,
    /// Handle to the shared result object, for deferred per-item updates.
    pub doc: SharedDoc<R>,
}

/// Successful result of one work-routine invocation.
///
/// Routines whose output is inherently a sequence report how many items they
/// produced via [`WorkOutput::items`]; the task's [`EmptyResultPolicy`] is
/// applied to that count. An expected-empty result is `Ok(items(0))`, never
/// an error: returning an error bypasses the empty-result handling entirely.
/// Value-shaped outputs ([`WorkOutput::value`]) carry no count and are
/// accepted as-is, however minimal.
pub struct WorkOutput<R> {
    pub(crate) patch: Option<DocPatch<R>>,
    pub(crate) item_count: Option<usize>,
    pub(crate) summary: Option<String>,
}

impl<R> WorkOutput<R> {
    /// A sequence-shaped result with `count` generated items.
    pub fn items(count: usize) -> Self {
        Self {
            patch: None,
            item_count: Some(count),
            summary: None,
        }
    }

    /// A single indivisible result (e.g. a summary object).
    pub fn value() -> Self {
        Self {
            patch: None,
            item_count: None,
            summary: None,
        }
    }

    /// Attach a read-modify-write patch, folded into the shared result
    /// object when the output is accepted. A discarded output (empty result
    /// under `Fail` or `RetryOnce`) never has its patch applied.
    pub fn with_patch(mut self, patch: impl FnOnce(&mut R) + Send + 'static) -> Self {
        self.patch = Some(Box::new(patch));
        self
    }

    /// Attach a short human-readable summary, recorded on the task state.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub(crate) fn is_declared_empty(&self) -> bool {
        self.item_count == Some(0)
    }
}

/// Immutable description of one unit of orchestrated work.
pub struct TaskSpec<R> {
    pub(crate) name: TaskName,
    pub(crate) depends_on: Option<TaskName>,
    pub(crate) start_offset: Duration,
    pub(crate) progress_lines: Vec<String>,
    pub(crate) on_empty: EmptyResultPolicy,
    pub(crate) work: WorkFn<R>,
}

impl<R> TaskSpec<R> {
    /// Create a spec with no dependency, a zero start offset, no progress
    /// lines and the default ([`EmptyResultPolicy::Accept`]) empty policy.
    pub fn new<F, Fut>(name: impl Into<String>, work: F) -> Self
    where
        F: Fn(TaskContext<R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<WorkOutput<R>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            depends_on: None,
            start_offset: Duration::ZERO,
            progress_lines: Vec::new(),
            on_empty: EmptyResultPolicy::default(),
            work: Arc::new(move |ctx| {
                let fut: WorkFuture<R> = Box::pin(work(ctx));
                fut
            }),
        }
    }

    /// Gate this task on another task in the same plan reaching a terminal
    /// state. The gate is on *terminal*, not on success: a failed dependency
    /// still unblocks this task.
    pub fn depends_on(mut self, dep: impl Into<String>) -> Self {
        self.depends_on = Some(dep.into());
        self
    }

    /// Earliest run-elapsed time at which this task may start.
    pub fn start_offset(mut self, offset: Duration) -> Self {
        self.start_offset = offset;
        self
    }

    /// Status strings cycled on the task state while the task is working.
    /// A task with no lines gets no progress ticker.
    pub fn progress_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.progress_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Policy applied when the work routine succeeds with zero items.
    pub fn on_empty(mut self, policy: EmptyResultPolicy) -> Self {
        self.on_empty = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R> fmt::Debug for TaskSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("start_offset", &self.start_offset)
            .field("progress_lines", &self.progress_lines)
            .field("on_empty", &self.on_empty)
            .finish_non_exhaustive()
    }
}
