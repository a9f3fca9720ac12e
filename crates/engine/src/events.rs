// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fan-out engine
//!
//! Handler registrations are rebuilt once per scheduling pass using a
//! double-buffered protocol: `start_update_phase` opens fresh buffers,
//! `register_handlers` fills them job by job, and `end_update_phase`
//! swaps them in wholesale. Readers always see either the previous or
//! the new generation, never a half-built map.
//!
//! An event name prefixed `local.` or `this.` is scoped to the firing
//! job's group; any other name is global. Delivery is best-effort and
//! in-process: firing builds new tasks, it does not wait for handlers.

use cogwork_core::{Clock, Job, JobStore, Origin, Record, Task};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

#[derive(Clone, Debug)]
struct Handler {
    job_id: String,
    job_name: String,
}

#[derive(Default)]
struct HandlerMaps {
    /// group -> bare event name -> handlers
    local: HashMap<String, HashMap<String, Vec<Handler>>>,
    /// bare event name -> handlers
    global: HashMap<String, Vec<Handler>>,
}

fn scoped_key(name: &str) -> (bool, &str) {
    if let Some(bare) = name.strip_prefix("local.") {
        (true, bare)
    } else if let Some(bare) = name.strip_prefix("this.") {
        (true, bare)
    } else {
        (false, name)
    }
}

/// Routes fired events to listening jobs as new tasks
pub struct EventEngine {
    store: Arc<dyn JobStore>,
    clock: Arc<dyn Clock>,
    live: RwLock<Arc<HandlerMaps>>,
    pending: Mutex<Option<HandlerMaps>>,
}

impl EventEngine {
    pub fn new(store: Arc<dyn JobStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            live: RwLock::new(Arc::new(HandlerMaps::default())),
            pending: Mutex::new(None),
        }
    }

    /// Open fresh registration buffers for this pass
    pub fn start_update_phase(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *pending = Some(HandlerMaps::default());
    }

    /// Record the events one job listens to (called once per job
    /// during the scheduling sweep)
    pub fn register_handlers(&self, job: &Job) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let Some(maps) = pending.as_mut() else {
            tracing::warn!(job = %job.name, "register_handlers outside an update phase");
            return;
        };
        for event in &job.events {
            if event == cogwork_core::ON_STARTUP_EVENT {
                continue;
            }
            let handler = Handler {
                job_id: job.id.clone(),
                job_name: job.name.clone(),
            };
            let (local, bare) = scoped_key(event);
            if local {
                maps.local
                    .entry(job.group.clone())
                    .or_default()
                    .entry(bare.to_string())
                    .or_default()
                    .push(handler);
            } else {
                maps.global.entry(bare.to_string()).or_default().push(handler);
            }
        }
    }

    /// Atomically swap the live maps for the freshly built ones
    ///
    /// `fire_event` keeps serving the previous generation until this
    /// commits.
    pub fn end_update_phase(&self) {
        let built = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            pending.take()
        };
        let Some(built) = built else {
            tracing::warn!("end_update_phase without a matching start");
            return;
        };
        let mut live = self.live.write().unwrap_or_else(|e| e.into_inner());
        *live = Arc::new(built);
    }

    /// Build tasks for every job listening to this event
    ///
    /// Each handler job is reloaded fresh from the store; missing,
    /// disabled, or rootless jobs are skipped. The caller submits the
    /// returned tasks, so the firer never waits on handlers.
    pub fn fire_event(&self, name: &str, data: &Record, firing_job: &Job) -> Vec<Task> {
        let maps = {
            let live = self.live.read().unwrap_or_else(|e| e.into_inner());
            Arc::clone(&live)
        };

        let (local, bare) = scoped_key(name);
        let handlers: &[Handler] = if local {
            maps.local
                .get(&firing_job.group)
                .and_then(|by_name| by_name.get(bare))
                .map(Vec::as_slice)
                .unwrap_or(&[])
        } else {
            maps.global.get(bare).map(Vec::as_slice).unwrap_or(&[])
        };

        let now = self.clock.now();
        let mut tasks = Vec::new();
        for handler in handlers {
            let job = match self.store.get_job(&handler.job_id) {
                Ok(Some(job)) => job,
                Ok(None) => {
                    tracing::debug!(job = %handler.job_name, "event handler job no longer exists");
                    continue;
                }
                Err(error) => {
                    tracing::warn!(job = %handler.job_name, %error, "failed to reload handler job");
                    continue;
                }
            };
            if !job.enabled || job.root_action.is_none() {
                continue;
            }
            tracing::debug!(event = name, handler = %job.name, "event matched");
            tasks.push(
                Task::new(job, now, Origin::EventHandler).with_payload(vec![data.clone()]),
            );
        }
        tasks
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
