// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store backends
//!
//! Used by tests and by embedders that do not need durability. The
//! overflow task queue holds serialized tasks, matching what a durable
//! backend would round-trip (live streams are never carried over).

use cogwork_core::{ActionLogSink, Job, JobStore, LogEvent, LogFilter, StoreError, Task};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// In-memory `JobStore`
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
    config: RwLock<HashMap<String, String>>,
    tasks: Mutex<Vec<serde_json::Value>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently in the overflow queue
    pub fn queued_task_count(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl JobStore for MemoryJobStore {
    fn list_jobs(&self, filter_disabled: bool) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        let mut listed: Vec<Job> = jobs
            .values()
            .filter(|j| !filter_disabled || j.enabled)
            .cloned()
            .collect();
        // Stable sweep order for deterministic scheduling passes.
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    fn get_job(&self, id: &str) -> Result<Option<Job>, StoreError> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(jobs.get(id).cloned())
    }

    fn save_job(&self, job: &Job) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        Ok(jobs.insert(job.id.clone(), job.clone()).is_none())
    }

    fn remove_job(&self, id: &str) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        Ok(jobs.remove(id).is_some())
    }

    fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        let config = self.config.read().unwrap_or_else(|e| e.into_inner());
        Ok(config.get(key).cloned())
    }

    fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn config_table(&self) -> Result<HashMap<String, String>, StoreError> {
        let config = self.config.read().unwrap_or_else(|e| e.into_inner());
        Ok(config.clone())
    }

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks
            .iter()
            .map(|value| Ok(serde_json::from_value(value.clone())?))
            .collect()
    }

    fn enqueue_task(&self, task: &Task) -> Result<(), StoreError> {
        let value = serde_json::to_value(task)?;
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.push(value);
        Ok(())
    }

    fn remove_task(&self, id: &str) -> Result<(), StoreError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|value| value.get("id").and_then(|v| v.as_str()) != Some(id));
        Ok(())
    }
}

/// In-memory `ActionLogSink`
#[derive(Default)]
pub struct MemoryActionLog {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ActionLogSink for MemoryActionLog {
    fn write(&self, event: LogEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
    }

    fn read(&self, filter: &LogFilter) -> Vec<LogEvent> {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.iter().filter(|e| filter.matches(e)).cloned().collect()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
