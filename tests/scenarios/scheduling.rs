//! A due job runs exactly once per due time, in tree order.

use crate::prelude::*;
use chrono::Duration;
use cogwork_core::{Action, Job};

fn pipeline_job(now: chrono::DateTime<chrono::Utc>) -> Job {
    let mut job = Job::new("nightly-report")
        .with_group("reports")
        .with_schedule("* * * * *")
        .with_root_action(
            Action::module("scenario.tag").with_option("tag", "A").with_children(vec![
                Action::module("scenario.tag").with_option("tag", "B"),
                Action::module("scenario.tag").with_option("tag", "C"),
            ]),
        );
    job.next_execution = Some(now - Duration::seconds(1));
    job
}

#[tokio::test(start_paused = true)]
async fn due_job_runs_its_tree_in_order_and_is_pushed_past_the_window() {
    let s = scene();
    let job = pipeline_job(s.clock.now());
    s.store.save_job(&job).unwrap();

    s.runtime.execute().await.unwrap();
    wait_for(&s.trace, "C").await;

    assert_eq!(s.trace.entries(), vec!["A", "B", "C"]);
    let saved = s.store.get_job(&job.id).unwrap().unwrap();
    assert_eq!(saved.last_execution, Some(s.clock.now()));
    assert!(saved.next_execution.unwrap() >= s.clock.now() + Duration::seconds(45));
}

#[tokio::test(start_paused = true)]
async fn repeated_passes_do_not_rerun_an_already_waiting_job() {
    let s = scene();
    let job = pipeline_job(s.clock.now());
    s.store.save_job(&job).unwrap();

    s.runtime.execute().await.unwrap();
    s.runtime.execute().await.unwrap();
    wait_for(&s.trace, "C").await;
    s.runtime.execute().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;

    // One execution of the tree, despite three passes.
    assert_eq!(s.trace.entries(), vec!["A", "B", "C"]);
}

#[tokio::test(start_paused = true)]
async fn disabled_jobs_never_run() {
    let s = scene();
    let job = pipeline_job(s.clock.now()).disabled();
    s.store.save_job(&job).unwrap();

    s.runtime.execute().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;

    assert!(s.trace.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_trigger_runs_between_schedules() {
    let s = scene();
    let mut job = pipeline_job(s.clock.now());
    // Far in the future per its schedule.
    job.next_execution = Some(s.clock.now() + Duration::hours(1));
    s.store.save_job(&job).unwrap();

    s.runtime.execute().await.unwrap();
    assert_eq!(s.runtime.dispatcher().pending_count(), 0);

    s.runtime.trigger(&job.id).unwrap();
    wait_for(&s.trace, "C").await;
    assert_eq!(s.trace.entries(), vec!["A", "B", "C"]);
}
