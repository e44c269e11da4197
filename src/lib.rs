// src/lib.rs

pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod merge;
pub mod plan;
pub mod run;
pub mod types;

use crate::engine::{Engine, RunHandle};
use crate::plan::TaskPlan;

/// High-level entry point for callers that just want the settled outcome.
///
/// This wires together:
/// - a fresh shared result object seeded with `initial`
/// - an engine with default options
/// - a run over `plan`, awaited until every task is terminal
///
/// The returned handle is already settled; snapshot it for per-task states
/// and read the shared result object through [`RunHandle::doc`]. Callers
/// that want to observe progress while tasks run should use
/// [`Engine::start`] directly.
pub async fn run_to_settled<R>(plan: TaskPlan<R>, initial: R) -> RunHandle<R>
where
    R: Send + 'static,
{
    let mut handle = Engine::new().start(plan, initial);
    handle.wait_settled().await;
    handle
}
