// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job store contract
//!
//! The engine persists nothing itself; jobs, the system config table,
//! and the durable overflow task queue all live behind this trait.
//! Backends are swappable and carry no scheduling logic.

use crate::job::Job;
use crate::task::Task;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Persistent storage for jobs, config, and overflow tasks
pub trait JobStore: Send + Sync {
    /// List all jobs; `filter_disabled` drops disabled ones
    fn list_jobs(&self, filter_disabled: bool) -> Result<Vec<Job>, StoreError>;

    fn get_job(&self, id: &str) -> Result<Option<Job>, StoreError>;

    /// Returns whether the job was newly created
    fn save_job(&self, job: &Job) -> Result<bool, StoreError>;

    /// Returns whether a job was removed
    fn remove_job(&self, id: &str) -> Result<bool, StoreError>;

    fn get_config(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// The whole system config table (the lowest option layer)
    fn config_table(&self) -> Result<HashMap<String, String>, StoreError>;

    /// All tasks waiting in the durable overflow queue
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    fn enqueue_task(&self, task: &Task) -> Result<(), StoreError>;

    fn remove_task(&self, id: &str) -> Result<(), StoreError>;
}
