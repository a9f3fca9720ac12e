// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer/queue task dispatcher
//!
//! A task due within the high threshold is armed on an in-process
//! timer; anything further out goes to the store's durable overflow
//! queue and is picked up by a later `run_due` sweep. Task ids
//! deduplicate against the waiting set, which is how a scheduler pass
//! avoids re-arming a job that is already waiting.
//!
//! `close` flips the dispatcher into a terminal state: timers are
//! aborted and non-scheduler waiting tasks are persisted so they
//! survive a restart.

use crate::events::EventEngine;
use crate::executor;
use crate::locks::ExecutionLocks;
use crate::logger::ActionLogger;
use crate::registry::ModuleRegistry;
use chrono::{DateTime, Utc};
use cogwork_core::{
    mark_execution_start, ActionLogSink, Clock, Job, JobStore, LogLevel, Origin,
    ScheduleDecision, StoreError, Task, Thresholds,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatcher is closed")]
    Closed,
    #[error("task already waiting: {0}")]
    Duplicate(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

struct WaitingTask {
    task: Task,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct DispatchState {
    closed: bool,
    waiting: HashMap<String, WaitingTask>,
}

struct DispatcherInner {
    store: Arc<dyn JobStore>,
    registry: Arc<ModuleRegistry>,
    events: Arc<EventEngine>,
    sink: Arc<dyn ActionLogSink>,
    clock: Arc<dyn Clock>,
    thresholds: Thresholds,
    min_log_level: LogLevel,
    locks: Arc<ExecutionLocks>,
    state: Mutex<DispatchState>,
}

/// Cheap cloneable handle to the dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        store: Arc<dyn JobStore>,
        registry: Arc<ModuleRegistry>,
        events: Arc<EventEngine>,
        sink: Arc<dyn ActionLogSink>,
        clock: Arc<dyn Clock>,
        thresholds: Thresholds,
        min_log_level: LogLevel,
        locks: Arc<ExecutionLocks>,
    ) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                store,
                registry,
                events,
                sink,
                clock,
                thresholds,
                min_log_level,
                locks,
                state: Mutex::new(DispatchState::default()),
            }),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    pub(crate) fn store(&self) -> &Arc<dyn JobStore> {
        &self.inner.store
    }

    pub(crate) fn registry(&self) -> &ModuleRegistry {
        &self.inner.registry
    }

    pub(crate) fn events(&self) -> &EventEngine {
        &self.inner.events
    }

    /// The system config table, or an empty map if the store fails
    pub(crate) fn system_options(&self) -> HashMap<String, String> {
        match self.inner.store.config_table() {
            Ok(table) => table,
            Err(error) => {
                tracing::warn!(%error, "failed to load system config table");
                HashMap::new()
            }
        }
    }

    /// Logger bound to one executing tree node
    pub(crate) fn node_logger(&self, job: &Job, module: &str, origin: Origin) -> ActionLogger {
        ActionLogger::new(
            Arc::clone(&self.inner.sink),
            Arc::clone(&self.inner.clock),
            self.inner.min_log_level,
            job,
            module,
            origin,
        )
    }

    /// Number of tasks armed on timers
    pub fn pending_count(&self) -> usize {
        let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        state.waiting.len()
    }

    /// Accept a task: arm a timer if it is due within the high
    /// threshold, otherwise persist it to the overflow queue
    ///
    /// Rejects tasks whose id is already waiting, and everything once
    /// the dispatcher is closed.
    pub fn try_add_task(&self, task: Task) -> Result<(), DispatchError> {
        let now = self.now();
        let horizon = now + self.inner.thresholds.high;
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.closed {
            return Err(DispatchError::Closed);
        }
        if state.waiting.contains_key(&task.id) {
            return Err(DispatchError::Duplicate(task.id));
        }
        if task.start > horizon {
            tracing::debug!(task = %task.id, job = %task.job.name, start = %task.start,
                "task beyond timer horizon, persisting");
            self.inner.store.enqueue_task(&task)?;
            return Ok(());
        }

        let delay = (task.start - now).to_std().unwrap_or_default();
        let id = task.id.clone();
        let dispatcher = self.clone();
        let sleeper_id = id.clone();
        // The sleeper's first lock acquisition waits for the insert
        // below, so it cannot fire before the task is in the map.
        let timer = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let fired = {
                let mut state = dispatcher
                    .inner
                    .state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner());
                if state.closed {
                    return;
                }
                state.waiting.remove(&sleeper_id).map(|w| w.task)
            };
            if let Some(task) = fired {
                dispatcher.run_task(task).await;
            }
        });
        state.waiting.insert(id, WaitingTask { task, timer });
        Ok(())
    }

    /// Run one fired task end to end
    async fn run_task(&self, mut task: Task) {
        let now = self.now();
        // Durable origins run against the job definition as it stands
        // now, not as it stood when the task was created.
        if matches!(
            task.origin,
            Origin::Scheduler | Origin::Request | Origin::EventHandler
        ) {
            match self.inner.store.get_job(&task.job.id) {
                Ok(Some(job)) => task.job = job,
                Ok(None) => {
                    tracing::debug!(job = %task.job.name, "job removed before execution, dropping task");
                    return;
                }
                Err(error) => {
                    tracing::warn!(job = %task.job.name, %error, "failed to reload job, dropping task");
                    return;
                }
            }
        }

        if task.origin == Origin::Scheduler {
            if !task.job.enabled {
                tracing::debug!(job = %task.job.name, "job disabled, dropping scheduled task");
                return;
            }
            mark_execution_start(&mut task.job, now, &self.inner.thresholds);
            if let Err(error) = self.inner.store.save_job(&task.job) {
                tracing::warn!(job = %task.job.name, %error, "failed to persist execution start");
            }
        }

        tracing::debug!(task = %task.id, job = %task.job.name, origin = %task.origin, "task started");
        {
            let _token = self.inner.locks.acquire(&task.job.id);
            executor::run_tree(self, &mut task).await;
        }
        match &task.error {
            Some(error) => {
                tracing::debug!(task = %task.id, job = %task.job.name, error, "task finished with failure")
            }
            None => tracing::debug!(task = %task.id, job = %task.job.name, "task finished"),
        }

        if task.origin == Origin::Scheduler {
            self.resubmit(&task.job.id);
        }
    }

    /// Re-evaluate a job right after a scheduled run
    ///
    /// The definition may have been edited mid-run, so it is reloaded
    /// before deciding.
    fn resubmit(&self, job_id: &str) {
        let mut job = match self.inner.store.get_job(job_id) {
            Ok(Some(job)) => job,
            Ok(None) => return,
            Err(error) => {
                tracing::warn!(job_id, %error, "failed to reload job after run");
                return;
            }
        };
        if !job.enabled {
            return;
        }
        let now = self.now();
        match self.inner.thresholds.evaluate(&mut job, now) {
            ScheduleDecision::ShouldExecute => {
                let start = job.next_execution.unwrap_or(now);
                let id = job.id.clone();
                let task = Task::new(job, start, Origin::Scheduler).with_id(id);
                if let Err(error) = self.try_add_task(task) {
                    tracing::debug!(job_id, %error, "resubmit rejected");
                }
            }
            ScheduleDecision::Rescheduled => {
                if let Err(error) = self.inner.store.save_job(&job) {
                    tracing::warn!(job = %job.name, %error, "failed to persist reschedule");
                }
            }
            ScheduleDecision::None => {}
        }
    }

    /// Sweep the overflow queue: arm tasks now due, discard tasks
    /// expired past the low threshold
    ///
    /// Returns how many tasks were moved onto timers.
    pub async fn run_due(&self) -> Result<usize, DispatchError> {
        let now = self.now();
        let horizon = now + self.inner.thresholds.high;
        let expiry = now - self.inner.thresholds.low;
        let mut armed = 0;
        for task in self.inner.store.list_tasks()? {
            if task.start < expiry {
                tracing::warn!(task = %task.id, job = %task.job.name, start = %task.start,
                    "queued task expired, discarding");
                if let Err(error) = self.inner.store.remove_task(&task.id) {
                    tracing::warn!(task = %task.id, %error, "failed to remove expired task");
                }
                continue;
            }
            if task.start > horizon {
                continue;
            }
            if let Err(error) = self.inner.store.remove_task(&task.id) {
                tracing::warn!(task = %task.id, %error, "failed to dequeue task");
                continue;
            }
            match self.try_add_task(task) {
                Ok(()) => armed += 1,
                Err(DispatchError::Duplicate(id)) => {
                    tracing::debug!(task = %id, "queued task already waiting");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(armed)
    }

    /// Stop accepting tasks and abort all armed timers
    ///
    /// Waiting tasks of durable non-scheduler origins are persisted to
    /// the overflow queue unless `discard_waiting` is set. Scheduler
    /// tasks are always dropped (the next start re-derives them from
    /// the job definitions), and tasks carrying a live record stream
    /// cannot be resumed and are dropped too.
    pub fn close(&self, discard_waiting: bool) {
        let drained: Vec<Task> = {
            let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            state.closed = true;
            state
                .waiting
                .drain()
                .map(|(_, waiting)| {
                    waiting.timer.abort();
                    waiting.task
                })
                .collect()
        };
        for task in drained {
            if discard_waiting || task.origin == Origin::Scheduler {
                continue;
            }
            if task.stream.is_some() {
                tracing::debug!(task = %task.id, "dropping waiting task with live stream");
                continue;
            }
            if let Err(error) = self.inner.store.enqueue_task(&task) {
                tracing::warn!(task = %task.id, %error, "failed to persist waiting task");
            }
        }
    }

    /// Wait for in-flight executions to finish, up to `timeout`
    pub async fn wait_idle(&self, timeout: std::time::Duration) -> bool {
        self.inner.locks.wait_idle(timeout).await
    }

    /// Number of executions currently holding a lock token
    pub fn active_count(&self) -> usize {
        self.inner.locks.active_count()
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
