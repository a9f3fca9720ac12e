//! Event fan-out between jobs, with group-scoped delivery.

use crate::prelude::*;
use cogwork_core::{Action, Job};

fn firer(group: &str, event: &str) -> Job {
    Job::new("deployer")
        .with_group(group)
        .with_root_action(Action::module("scenario.fire").with_option("event", event))
}

fn listener(name: &str, group: &str, event: &str, tag: &str) -> Job {
    Job::new(name)
        .with_group(group)
        .with_event(event)
        .with_root_action(Action::module("scenario.tag").with_option("tag", tag))
}

#[tokio::test(start_paused = true)]
async fn global_event_crosses_groups() {
    let s = scene();
    let firer = firer("builds", "deploy.finished");
    s.store.save_job(&firer).unwrap();
    s.store
        .save_job(&listener("audit", "ops", "deploy.finished", "audited"))
        .unwrap();

    s.runtime.execute().await.unwrap();
    s.runtime.trigger(&firer.id).unwrap();

    wait_for(&s.trace, "audited").await;
}

#[tokio::test(start_paused = true)]
async fn local_event_is_confined_to_the_firing_group() {
    let s = scene();
    let firer = firer("builds", "local.step");
    s.store.save_job(&firer).unwrap();
    s.store
        .save_job(&listener("near", "builds", "local.step", "near-heard"))
        .unwrap();
    s.store
        .save_job(&listener("far", "ops", "local.step", "far-heard"))
        .unwrap();

    s.runtime.execute().await.unwrap();
    s.runtime.trigger(&firer.id).unwrap();

    wait_for(&s.trace, "near-heard").await;
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert!(!s.trace.contains("far-heard"));
}

#[tokio::test(start_paused = true)]
async fn listener_edits_apply_to_later_firings() {
    let s = scene();
    let firer = firer("builds", "deploy.finished");
    s.store.save_job(&firer).unwrap();
    let audit = listener("audit", "ops", "deploy.finished", "audited");
    s.store.save_job(&audit).unwrap();

    s.runtime.execute().await.unwrap();
    s.runtime.trigger(&firer.id).unwrap();
    wait_for(&s.trace, "audited").await;

    // Disable the listener; the handler reload drops it on the next
    // firing even before a new registration pass.
    s.store.save_job(&audit.clone().disabled()).unwrap();
    s.runtime.trigger(&firer.id).unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;

    assert_eq!(
        s.trace.entries().iter().filter(|e| *e == "audited").count(),
        1
    );
}
