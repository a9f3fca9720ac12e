//! The builtin `core.` module set, driven through a real pipeline.

use crate::prelude::*;
use cogwork_core::{ActionLogSink, Action, Job, LogFilter, LogLevel};

#[tokio::test(start_paused = true)]
async fn emit_log_collect_pipeline_writes_the_action_log() {
    let s = scene();
    let job = Job::new("etl").with_group("pipelines").with_root_action(
        Action::module("core.emit")
            .with_option("records", r#"[1, 2, 3]"#)
            .with_children(vec![
                Action::module("core.log").with_option("message", "handing off"),
                Action::module("core.collect"),
            ]),
    );
    s.store.save_job(&job).unwrap();

    s.runtime.trigger(&job.id).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(120), async {
        loop {
            let filter = LogFilter {
                min_level: Some(LogLevel::Info),
                ..LogFilter::default()
            };
            let events = s.sink.read(&filter);
            if events
                .iter()
                .any(|e| e.message == "collected 3 records")
            {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let events = s.sink.read(&LogFilter::default());
    assert!(events.iter().any(|e| e.message == "handing off"));
    assert!(events.iter().all(|e| e.job_name == "etl"));
    assert!(events.iter().all(|e| e.group == "pipelines"));
}

#[tokio::test(start_paused = true)]
async fn comma_separated_records_are_emitted_as_strings() {
    let s = scene();
    let job = Job::new("listing").with_root_action(
        Action::module("core.emit")
            .with_option("records", "alpha, beta")
            .with_children(vec![Action::module("scenario.sink")]),
    );
    s.store.save_job(&job).unwrap();

    s.runtime.trigger(&job.id).unwrap();
    wait_for(&s.trace, "consumed \"beta\"").await;
    assert!(s.trace.contains("consumed \"alpha\""));
}

#[tokio::test(start_paused = true)]
async fn missing_required_option_fails_the_node() {
    let s = scene();
    let job = Job::new("broken").with_root_action(
        Action::module("core.log").with_children(vec![
            Action::module("scenario.tag").with_option("tag", "skipped"),
        ]),
    );
    s.store.save_job(&job).unwrap();

    s.runtime.trigger(&job.id).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(120), async {
        loop {
            let events = s.sink.read(&LogFilter::default());
            if events.iter().any(|e| e.level == LogLevel::Error) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    // The failed node's children never ran.
    assert!(!s.trace.contains("skipped"));
    let events = s.sink.read(&LogFilter::default());
    assert!(events
        .iter()
        .any(|e| e.error.as_deref().is_some_and(|d| d.contains("message"))));
}
