// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::exec;
use crate::merge::SharedDoc;
use crate::plan::{TaskPlan, WorkFn};
use crate::run::{RunBoard, RunSnapshot};
use crate::types::{EmptyResultPolicy, TaskName};

use super::core::RunCore;
use super::handle::RunHandle;
use super::{CoreCommand, EngineEvent, EngineOptions};

/// Entry point for starting runs.
///
/// An engine is nothing but a bag of options; each call to [`Engine::start`]
/// wires up an independent run loop and returns the handle observing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Start every task of `plan` against a fresh shared result object
    /// seeded with `initial`.
    ///
    /// Returns immediately; the run proceeds on background tasks. Tasks are
    /// dispatched as their gates open, all failures are tolerated, and the
    /// run settles once every task is terminal. Dropping the returned handle
    /// abandons observation of the run without interrupting in-flight work.
    pub fn start<R>(&self, plan: TaskPlan<R>, initial: R) -> RunHandle<R>
    where
        R: Send + 'static,
    {
        let doc = SharedDoc::new(initial);
        let core = RunCore::new(RunBoard::from_plan(&plan));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(core.snapshot());

        let mut tasks = HashMap::with_capacity(plan.len());
        let mut offsets = Vec::new();
        for spec in plan.tasks {
            if !spec.start_offset.is_zero() {
                offsets.push((spec.name.clone(), spec.start_offset));
            }
            tasks.insert(
                spec.name,
                PreparedTask {
                    work: spec.work,
                    on_empty: spec.on_empty,
                    has_progress: !spec.progress_lines.is_empty(),
                },
            );
        }

        let runtime = EngineRuntime {
            core,
            event_rx,
            event_tx: event_tx.clone(),
            doc: doc.clone(),
            tasks,
            offsets,
            reporters: HashMap::new(),
            started: Instant::now(),
            snapshot_tx,
            options: self.options,
        };
        tokio::spawn(runtime.run());

        RunHandle::new(event_tx, snapshot_rx, doc)
    }
}

/// Runnable form of one task spec: what the shell needs at dispatch time.
struct PreparedTask<R> {
    work: WorkFn<R>,
    on_empty: EmptyResultPolicy,
    has_progress: bool,
}

/// Drives one run in response to `EngineEvent`s.
///
/// This is a pure IO shell around [`RunCore`], which contains all the run
/// semantics. The shell reads events from the channel, spawns workers,
/// offset timers and reporters, and publishes a fresh snapshot to observers
/// after every step.
pub struct EngineRuntime<R> {
    core: RunCore,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    doc: SharedDoc<R>,
    tasks: HashMap<TaskName, PreparedTask<R>>,
    offsets: Vec<(TaskName, Duration)>,
    /// At most one live reporter per task name; removal is what makes
    /// stopping idempotent.
    reporters: HashMap<TaskName, oneshot::Sender<()>>,
    started: Instant,
    snapshot_tx: watch::Sender<RunSnapshot>,
    options: EngineOptions,
}

impl<R> fmt::Debug for EngineRuntime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRuntime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<R: Send + 'static> EngineRuntime<R> {
    /// Main run loop.
    ///
    /// - Sweeps initially ready tasks, then consumes `EngineEvent`s.
    /// - Feeds each event into the pure core and executes the commands it
    ///   returns.
    /// - Publishes a snapshot after every step, the settled one included.
    async fn run(mut self) {
        info!(tasks = self.core.task_count(), "run started");

        self.spawn_offset_timers();

        let step = self.core.start();
        self.execute_commands(step.commands);
        self.publish();
        if !step.keep_running {
            info!("run settled");
            return;
        }

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    debug!("event channel closed; run loop exiting");
                    break;
                }
            };

            debug!(?event, "run loop received event");

            let elapsed = self.started.elapsed();
            let step = self.core.step(event, elapsed);

            self.execute_commands(step.commands);
            self.publish();

            if !step.keep_running {
                break;
            }
        }

        // Whatever ended the loop, no reporter may outlive it.
        self.stop_all_reporters();

        if self.core.is_settled() {
            info!("run settled");
        } else {
            info!("run abandoned before settling");
        }
    }

    /// One timer per non-zero start offset; zero offsets are already marked
    /// elapsed on the board.
    fn spawn_offset_timers(&mut self) {
        for (task, offset) in self.offsets.drain(..) {
            let events = self.event_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(offset).await;
                let _ = events.send(EngineEvent::OffsetElapsed { task });
            });
        }
    }

    fn execute_commands(&mut self, commands: Vec<CoreCommand>) {
        for command in commands {
            match command {
                CoreCommand::DispatchTasks(tasks) => self.dispatch(tasks),
                CoreCommand::StopReporter(task) => self.stop_reporter(&task),
                CoreCommand::StopAllReporters => self.stop_all_reporters(),
            }
        }
    }

    /// Spawn a worker, and a reporter where the task declared progress
    /// lines, for each newly working task.
    fn dispatch(&mut self, tasks: Vec<TaskName>) {
        if tasks.is_empty() {
            return;
        }

        let names: Vec<&str> = tasks.iter().map(String::as_str).collect();
        debug!(?names, "dispatching ready tasks");

        for task in tasks {
            // Each task is dispatched at most once, so its prepared form can
            // be moved out of the map.
            let Some(prepared) = self.tasks.remove(&task) else {
                continue;
            };

            if prepared.has_progress {
                self.spawn_reporter(task.clone());
            }

            let _ = exec::spawn_worker(
                task,
                prepared.work,
                prepared.on_empty,
                self.doc.clone(),
                self.event_tx.clone(),
            );
        }
    }

    fn spawn_reporter(&mut self, task: TaskName) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let _ = exec::spawn_reporter(
            task.clone(),
            self.options.progress_period,
            self.event_tx.clone(),
            cancel_rx,
        );
        self.reporters.insert(task, cancel_tx);
    }

    fn stop_reporter(&mut self, task: &str) {
        if let Some(cancel) = self.reporters.remove(task) {
            if cancel.send(()).is_err() {
                debug!(task = %task, "reporter already gone");
            }
        }
    }

    fn stop_all_reporters(&mut self) {
        for (task, cancel) in self.reporters.drain() {
            if cancel.send(()).is_err() {
                debug!(task = %task, "reporter already gone");
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.core.snapshot());
    }
}
