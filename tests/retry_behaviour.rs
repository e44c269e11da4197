// tests/retry_behaviour.rs

mod common;
use crate::common::{init_tracing, with_timeout, CourseDoc};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use genflow::engine::Engine;
use genflow::plan::{TaskContext, TaskPlan, TaskSpec, WorkOutput};
use genflow::run::TaskStatus;
use genflow::types::EmptyResultPolicy;
use genflow_test_utils::works;

/// Build a task that records how many times its work routine ran.
fn counted<F>(name: &str, make_output: F) -> (TaskSpec<CourseDoc>, Arc<AtomicUsize>)
where
    F: Fn(u32) -> anyhow::Result<WorkOutput<CourseDoc>> + Send + Sync + 'static,
{
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in = Arc::clone(&calls);
    let spec = TaskSpec::new(name, move |ctx: TaskContext<CourseDoc>| {
        let calls = Arc::clone(&calls_in);
        let output = make_output(ctx.attempt);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            output
        }
    });
    (spec, calls)
}

async fn settle_one(spec: TaskSpec<CourseDoc>) -> genflow::engine::RunHandle<CourseDoc> {
    let plan = TaskPlan::new(vec![spec]).unwrap();
    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(with_timeout(handle.wait_settled()).await);
    handle
}

#[tokio::test]
async fn empty_result_is_accepted_by_default() {
    init_tracing();

    let handle = settle_one(works::empty("quiz")).await;
    let snap = handle.snapshot();
    let quiz = snap.task("quiz").unwrap();
    assert_eq!(quiz.status, TaskStatus::Complete);
    assert!(quiz.error.is_none());
}

#[tokio::test]
async fn empty_result_fails_when_declared_fatal() {
    init_tracing();

    let handle = settle_one(works::empty("quiz").on_empty(EmptyResultPolicy::Fail)).await;
    let snap = handle.snapshot();
    let quiz = snap.task("quiz").unwrap();
    assert_eq!(quiz.status, TaskStatus::Error);
    assert_eq!(quiz.error.as_deref(), Some("produced no items"));
}

#[tokio::test]
async fn empty_result_is_retried_once_and_the_retry_counts() {
    init_tracing();

    let (spec, calls) = counted("quiz", |attempt| {
        if attempt == 1 {
            Ok(WorkOutput::items(0))
        } else {
            Ok(WorkOutput::items(6).with_summary("6 questions"))
        }
    });

    let handle = settle_one(spec.on_empty(EmptyResultPolicy::RetryOnce)).await;
    let snap = handle.snapshot();
    let quiz = snap.task("quiz").unwrap();
    assert_eq!(quiz.status, TaskStatus::Complete);
    assert_eq!(quiz.result_summary.as_deref(), Some("6 questions"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn second_empty_result_fails_the_task() {
    init_tracing();

    let (spec, calls) = counted("quiz", |_attempt| Ok(WorkOutput::items(0)));

    let handle = settle_one(spec.on_empty(EmptyResultPolicy::RetryOnce)).await;
    let snap = handle.snapshot();
    let quiz = snap.task("quiz").unwrap();
    assert_eq!(quiz.status, TaskStatus::Error);
    assert_eq!(quiz.error.as_deref(), Some("produced no items after retry"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn value_shaped_output_is_never_retried() {
    init_tracing();

    // A value-shaped output carries no item count, so even the retry-once
    // policy has nothing to judge it empty by.
    let (spec, calls) = counted("summary", |_attempt| Ok(WorkOutput::value()));

    let handle = settle_one(spec.on_empty(EmptyResultPolicy::RetryOnce)).await;
    let snap = handle.snapshot();
    assert_eq!(snap.task("summary").unwrap().status, TaskStatus::Complete);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn errors_are_not_retried() {
    init_tracing();

    let (spec, calls) = counted("quiz", |_attempt| Err(anyhow::anyhow!("model unavailable")));

    let handle = settle_one(spec.on_empty(EmptyResultPolicy::RetryOnce)).await;
    let snap = handle.snapshot();
    let quiz = snap.task("quiz").unwrap();
    assert_eq!(quiz.status, TaskStatus::Error);
    assert!(quiz.error.as_deref().unwrap().contains("model unavailable"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn discarded_empty_output_never_applies_its_patch() {
    init_tracing();

    // First attempt: empty, with a patch that must be discarded with it.
    // Second attempt: non-empty, with its own patch.
    let spec = TaskSpec::new("quiz", |ctx: TaskContext<CourseDoc>| async move {
        if ctx.attempt == 1 {
            Ok(WorkOutput::items(0).with_patch(|doc: &mut CourseDoc| {
                doc.quiz_questions.push("stale question".to_string());
            }))
        } else {
            Ok(WorkOutput::items(1).with_patch(|doc: &mut CourseDoc| {
                doc.quiz_questions.push("fresh question".to_string());
            }))
        }
    })
    .on_empty(EmptyResultPolicy::RetryOnce);

    let handle = settle_one(spec).await;
    assert_eq!(
        handle.doc().read(|doc| doc.quiz_questions.clone()),
        vec!["fresh question".to_string()]
    );
}

#[tokio::test]
async fn accepted_empty_output_still_applies_its_patch() {
    init_tracing();

    let spec = TaskSpec::new("quiz", |_ctx: TaskContext<CourseDoc>| async move {
        Ok(WorkOutput::items(0).with_patch(|doc: &mut CourseDoc| {
            doc.notes.push("no questions generated".to_string());
        }))
    });

    let handle = settle_one(spec).await;
    assert_eq!(
        handle.doc().read(|doc| doc.notes.clone()),
        vec!["no questions generated".to_string()]
    );
}
