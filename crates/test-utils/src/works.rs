#![allow(dead_code)]

use std::time::Duration;

use genflow::plan::{TaskSpec, WorkOutput};

/// Pin the error type of canned work routines.
fn ok<R>(output: WorkOutput<R>) -> anyhow::Result<WorkOutput<R>> {
    Ok(output)
}

/// Task whose work immediately yields `count` items.
pub fn items<R: 'static>(name: &str, count: usize) -> TaskSpec<R> {
    TaskSpec::new(name, move |_ctx| async move { ok(WorkOutput::items(count)) })
}

/// Task whose work immediately yields a value-shaped output.
pub fn value<R: 'static>(name: &str) -> TaskSpec<R> {
    TaskSpec::new(name, |_ctx| async { ok(WorkOutput::value()) })
}

/// Task whose work immediately yields zero items.
pub fn empty<R: 'static>(name: &str) -> TaskSpec<R> {
    items(name, 0)
}

/// Task whose work fails with the given message.
pub fn fails<R: 'static>(name: &str, msg: &str) -> TaskSpec<R> {
    let msg = msg.to_string();
    TaskSpec::new(name, move |_ctx| {
        let msg = msg.clone();
        async move { Err(anyhow::anyhow!(msg)) }
    })
}

/// Task that yields zero items on the first invocation and `count` items on
/// the next. Pair with `EmptyResultPolicy::RetryOnce`.
pub fn empty_then_items<R: 'static>(name: &str, count: usize) -> TaskSpec<R> {
    TaskSpec::new(name, move |ctx| async move {
        if ctx.attempt == 1 {
            ok(WorkOutput::items(0))
        } else {
            ok(WorkOutput::items(count))
        }
    })
}

/// Task whose work sleeps for `delay` before yielding `count` items. Sleeps
/// follow the Tokio clock, so paused-clock tests control when these finish.
pub fn sleep_then_items<R: 'static>(
    name: &str,
    delay: Duration,
    count: usize,
) -> TaskSpec<R> {
    TaskSpec::new(name, move |_ctx| async move {
        tokio::time::sleep(delay).await;
        ok(WorkOutput::items(count))
    })
}

/// Task whose work never finishes. For abandonment tests only; a run over
/// this task never settles.
pub fn never_finishes<R: 'static>(name: &str) -> TaskSpec<R> {
    TaskSpec::new(name, |_ctx| async {
        std::future::pending::<()>().await;
        ok(WorkOutput::value())
    })
}
