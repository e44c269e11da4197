// tests/dependency_gating.rs

mod common;
use crate::common::{init_tracing, CourseDoc};

use std::time::Duration;

use genflow::engine::Engine;
use genflow::plan::{TaskContext, TaskPlan, TaskSpec};
use genflow::run::TaskStatus;
use genflow_test_utils::works;

// These tests run on the paused Tokio clock, so every sleep resolves at an
// exact run-elapsed instant and the recorded timestamps are deterministic.

#[tokio::test(start_paused = true)]
async fn dependent_starts_when_dependency_completes() {
    init_tracing();

    let plan = TaskPlan::new(vec![
        works::sleep_then_items("ingest", Duration::from_millis(400), 2),
        works::items("slides", 3).depends_on("ingest"),
    ])
    .unwrap();

    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(handle.wait_settled().await);

    let snap = handle.snapshot();
    let ingest = snap.task("ingest").unwrap();
    let slides = snap.task("slides").unwrap();

    assert_eq!(ingest.completed_at, Some(Duration::from_millis(400)));
    assert_eq!(slides.started_at, Some(Duration::from_millis(400)));
    assert_eq!(slides.status, TaskStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn start_waits_for_the_later_of_offset_and_dependency() {
    init_tracing();

    // Offset opens after the dependency: gate is the offset.
    let plan = TaskPlan::new(vec![
        works::sleep_then_items("ingest", Duration::from_millis(100), 1),
        works::items("quiz", 5)
            .depends_on("ingest")
            .start_offset(Duration::from_millis(500)),
    ])
    .unwrap();

    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(handle.wait_settled().await);
    let snap = handle.snapshot();
    assert_eq!(
        snap.task("quiz").unwrap().started_at,
        Some(Duration::from_millis(500))
    );

    // Dependency finishes after the offset: gate is the dependency.
    let plan = TaskPlan::new(vec![
        works::sleep_then_items("ingest", Duration::from_millis(500), 1),
        works::items("quiz", 5)
            .depends_on("ingest")
            .start_offset(Duration::from_millis(100)),
    ])
    .unwrap();

    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(handle.wait_settled().await);
    let snap = handle.snapshot();
    assert_eq!(
        snap.task("quiz").unwrap().started_at,
        Some(Duration::from_millis(500))
    );
}

#[tokio::test(start_paused = true)]
async fn failed_dependency_still_unblocks_dependents() {
    init_tracing();

    let ingest = TaskSpec::new("ingest", |_ctx: TaskContext<CourseDoc>| async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        Err(anyhow::anyhow!("unreadable upload"))
    });

    let plan = TaskPlan::new(vec![ingest, works::items("slides", 3).depends_on("ingest")]).unwrap();

    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(handle.wait_settled().await);

    let snap = handle.snapshot();
    assert!(snap.settled);

    let ingest = snap.task("ingest").unwrap();
    assert_eq!(ingest.status, TaskStatus::Error);
    assert!(ingest.error.as_deref().unwrap().contains("unreadable upload"));
    assert_eq!(ingest.completed_at, Some(Duration::from_millis(250)));

    // The dependent ran anyway, gated only on the dependency being terminal.
    let slides = snap.task("slides").unwrap();
    assert_eq!(slides.status, TaskStatus::Complete);
    assert_eq!(slides.started_at, Some(Duration::from_millis(250)));
}

#[tokio::test(start_paused = true)]
async fn chain_runs_strictly_in_sequence() {
    init_tracing();

    let plan = TaskPlan::new(vec![
        works::sleep_then_items("outline", Duration::from_millis(100), 4),
        works::sleep_then_items("slides", Duration::from_millis(200), 3).depends_on("outline"),
        works::sleep_then_items("summary", Duration::from_millis(50), 1).depends_on("slides"),
    ])
    .unwrap();

    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(handle.wait_settled().await);

    let snap = handle.snapshot();
    let outline = snap.task("outline").unwrap();
    let slides = snap.task("slides").unwrap();
    let summary = snap.task("summary").unwrap();

    assert_eq!(outline.started_at, Some(Duration::ZERO));
    assert_eq!(outline.completed_at, Some(Duration::from_millis(100)));
    assert_eq!(slides.started_at, Some(Duration::from_millis(100)));
    assert_eq!(slides.completed_at, Some(Duration::from_millis(300)));
    assert_eq!(summary.started_at, Some(Duration::from_millis(300)));
    assert_eq!(summary.completed_at, Some(Duration::from_millis(350)));
}

#[tokio::test(start_paused = true)]
async fn independent_tasks_overlap() {
    init_tracing();

    let plan = TaskPlan::new(vec![
        works::sleep_then_items("slides", Duration::from_millis(300), 3),
        works::sleep_then_items("quiz", Duration::from_millis(300), 5),
    ])
    .unwrap();

    let mut handle = Engine::new().start(plan, CourseDoc::default());
    assert!(handle.wait_settled().await);

    // Both start at the beginning and finish together; neither waits for
    // the other.
    let snap = handle.snapshot();
    for name in ["slides", "quiz"] {
        let state = snap.task(name).unwrap();
        assert_eq!(state.started_at, Some(Duration::ZERO));
        assert_eq!(state.completed_at, Some(Duration::from_millis(300)));
    }
}
