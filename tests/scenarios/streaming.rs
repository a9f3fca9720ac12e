//! The concurrent-consumer pattern end to end.

use crate::prelude::*;
use cogwork_core::{action, Action, Job};

#[tokio::test(start_paused = true)]
async fn bounded_consumer_paces_the_producer() {
    let s = scene();
    let consumer = Action::module("scenario.sink")
        .with_option(action::CONCURRENT_CONSUMER, "true")
        .with_option(action::CONCURRENT_CONSUMER_QUEUE_LIMIT, "1");
    let job = Job::new("exporter").with_root_action(
        Action::module("scenario.numbers")
            .with_option("count", "5")
            .with_children(vec![consumer]),
    );
    s.store.save_job(&job).unwrap();

    s.runtime.trigger(&job.id).unwrap();
    wait_for(&s.trace, "consumed 5").await;

    // With capacity 1 the producer cannot run ahead of the consumer.
    assert!(s.trace.position("emitted 3") > s.trace.position("consumed 1"));
    assert!(s.trace.position("emitted 5") > s.trace.position("consumed 3"));
}

#[tokio::test(start_paused = true)]
async fn consumer_sees_end_of_stream_when_the_producer_finishes() {
    let s = scene();
    let consumer = Action::module("scenario.sink")
        .with_option(action::CONCURRENT_CONSUMER, "true");
    let job = Job::new("exporter").with_root_action(
        Action::module("scenario.numbers")
            .with_option("count", "2")
            .with_children(vec![consumer, Action::module("scenario.tag").with_option("tag", "done")]),
    );
    s.store.save_job(&job).unwrap();

    s.runtime.trigger(&job.id).unwrap();
    wait_for(&s.trace, "done").await;
    wait_for(&s.trace, "consumed 2").await;
    assert!(s
        .runtime
        .dispatcher()
        .wait_idle(std::time::Duration::from_secs(5))
        .await);
}

#[tokio::test(start_paused = true)]
async fn without_the_flag_records_flow_to_the_next_node_in_order() {
    let s = scene();
    let job = Job::new("exporter").with_root_action(
        Action::module("scenario.numbers")
            .with_option("count", "2")
            .with_children(vec![Action::module("scenario.sink")]),
    );
    s.store.save_job(&job).unwrap();

    s.runtime.trigger(&job.id).unwrap();
    wait_for(&s.trace, "consumed 2").await;

    assert_eq!(
        s.trace.entries(),
        vec!["emitted 1", "emitted 2", "consumed 1", "consumed 2"]
    );
}
