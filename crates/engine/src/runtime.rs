// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator runtime
//!
//! Owns the dispatcher, the event engine, and the module registry, and
//! drives one scheduling pass per call to `execute`. A pass sweeps the
//! overflow queue, evaluates every enabled job against the scheduling
//! model, and rebuilds the event-handler registrations in one
//! double-buffered update phase.

use crate::dispatcher::{DispatchError, Dispatcher};
use crate::events::EventEngine;
use crate::locks::ExecutionLocks;
use crate::registry::ModuleRegistry;
use cogwork_core::{
    ActionLogSink, Clock, JobStore, LogLevel, Origin, ScheduleDecision, StoreError, Task,
    Thresholds, ON_STARTUP_EVENT,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Tuning knobs of the runtime
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    pub thresholds: Thresholds,
    /// Events below this level are not written to the action log
    pub min_log_level: LogLevel,
    /// Expiry of execution-lock tokens left behind by a crashed run
    pub lock_ttl: chrono::Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            min_log_level: LogLevel::Info,
            lock_ttl: chrono::Duration::minutes(10),
        }
    }
}

/// The orchestrator: one instance per process
pub struct Runtime {
    store: Arc<dyn JobStore>,
    registry: Arc<ModuleRegistry>,
    events: Arc<EventEngine>,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    thresholds: Thresholds,
    passes: AtomicU64,
}

impl Runtime {
    pub fn new(
        store: Arc<dyn JobStore>,
        registry: Arc<ModuleRegistry>,
        sink: Arc<dyn ActionLogSink>,
        clock: Arc<dyn Clock>,
        config: RuntimeConfig,
    ) -> Self {
        let events = Arc::new(EventEngine::new(Arc::clone(&store), Arc::clone(&clock)));
        let locks = Arc::new(ExecutionLocks::new(Arc::clone(&clock), config.lock_ttl));
        let dispatcher = Dispatcher::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&events),
            sink,
            Arc::clone(&clock),
            config.thresholds,
            config.min_log_level,
            locks,
        );
        Self {
            store,
            registry,
            events,
            dispatcher,
            clock,
            thresholds: config.thresholds,
            passes: AtomicU64::new(0),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Completed scheduling passes since start
    pub fn pass_count(&self) -> u64 {
        self.passes.load(Ordering::SeqCst)
    }

    /// Run one scheduling pass
    pub async fn execute(&self) -> Result<(), RuntimeError> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.clock.now();
        tracing::debug!(pass, "scheduling pass started");

        if let Err(error) = self.dispatcher.run_due().await {
            tracing::warn!(%error, "overflow queue sweep failed");
        }

        self.events.start_update_phase();
        let jobs = self.store.list_jobs(true)?;
        for mut job in jobs {
            // Startup listeners are forced due on the first pass and
            // flow through the ordinary scheduler path, so the run is
            // recorded and deduplicated like any other.
            if pass == 1 && job.listens_to(ON_STARTUP_EVENT) {
                job.next_execution = Some(now);
            }
            match self.thresholds.evaluate(&mut job, now) {
                ScheduleDecision::ShouldExecute => {
                    let start = job.next_execution.unwrap_or(now);
                    let id = job.id.clone();
                    let name = job.name.clone();
                    let task = Task::new(job.clone(), start, Origin::Scheduler).with_id(id);
                    match self.dispatcher.try_add_task(task) {
                        Ok(()) => tracing::debug!(job = %name, %start, "scheduled task armed"),
                        Err(DispatchError::Duplicate(_)) => {
                            tracing::debug!(job = %name, "job already waiting")
                        }
                        Err(error) => tracing::warn!(job = %name, %error, "failed to arm job"),
                    }
                }
                ScheduleDecision::Rescheduled => {
                    if let Err(error) = self.store.save_job(&job) {
                        tracing::warn!(job = %job.name, %error, "failed to persist reschedule");
                    }
                }
                ScheduleDecision::None => {}
            }
            self.events.register_handlers(&job);
        }
        self.events.end_update_phase();

        tracing::debug!(pass, "scheduling pass finished");
        Ok(())
    }

    /// Run a job now, regardless of its schedule
    ///
    /// Returns the submitted task's id. Explicit triggers bypass the
    /// enabled flag.
    pub fn trigger(&self, job_id: &str) -> Result<String, RuntimeError> {
        let job = self
            .store
            .get_job(job_id)?
            .ok_or_else(|| RuntimeError::JobNotFound(job_id.to_string()))?;
        let task = Task::new(job, self.clock.now(), Origin::Request);
        let id = task.id.clone();
        self.dispatcher.try_add_task(task)?;
        Ok(id)
    }

    /// Persist registration jobs declared by system modules
    ///
    /// Idempotent: a registration job is only saved when no job with
    /// its (stable) id exists yet. Returns how many were created.
    pub fn install_system_jobs(&self) -> Result<usize, RuntimeError> {
        let mut created = 0;
        for job in self.registry.system_registration_jobs() {
            if self.store.get_job(&job.id)?.is_none() {
                self.store.save_job(&job)?;
                tracing::info!(job = %job.name, "installed system registration job");
                created += 1;
            }
        }
        Ok(created)
    }

    /// Shut down: stop accepting tasks, persist or discard the waiting
    /// set, and drain in-flight executions up to `timeout`
    ///
    /// Returns whether the drain completed before the timeout.
    pub async fn close(&self, discard_waiting: bool, timeout: std::time::Duration) -> bool {
        self.dispatcher.close(discard_waiting);
        let drained = self.dispatcher.wait_idle(timeout).await;
        if !drained {
            tracing::warn!(active = self.dispatcher.active_count(), "drain timed out");
        }
        drained
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
