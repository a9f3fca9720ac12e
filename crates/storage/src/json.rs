// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based job store
//!
//! Layout under the base directory:
//!
//! ```text
//! jobs/<id>.json     one file per job
//! tasks/<id>.json    the durable overflow task queue
//! config.json        the system config table
//! ```

use cogwork_core::{Job, JobStore, StoreError, Task};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const JOBS_DIR: &str = "jobs";
const TASKS_DIR: &str = "tasks";
const CONFIG_FILE: &str = "config.json";

/// JSON file-based `JobStore`
#[derive(Clone)]
pub struct JsonJobStore {
    base_path: PathBuf,
}

impl JsonJobStore {
    /// Open a store at the given path, creating directories as needed
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        fs::create_dir_all(base_path.join(JOBS_DIR))?;
        fs::create_dir_all(base_path.join(TASKS_DIR))?;
        Ok(Self { base_path })
    }

    fn entry_path(&self, dir: &str, id: &str) -> PathBuf {
        self.base_path.join(dir).join(format!("{id}.json"))
    }

    fn read_dir_files(&self, dir: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.base_path.join(dir);
        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }

    fn load_config(&self) -> Result<HashMap<String, String>, StoreError> {
        let path = self.base_path.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl JobStore for JsonJobStore {
    fn list_jobs(&self, filter_disabled: bool) -> Result<Vec<Job>, StoreError> {
        let mut jobs = Vec::new();
        for path in self.read_dir_files(JOBS_DIR)? {
            let json = fs::read_to_string(&path)?;
            match serde_json::from_str::<Job>(&json) {
                Ok(job) if !filter_disabled || job.enabled => jobs.push(job),
                Ok(_) => {}
                Err(error) => {
                    // A corrupt file must not take down the sweep.
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable job file");
                }
            }
        }
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(jobs)
    }

    fn get_job(&self, id: &str) -> Result<Option<Job>, StoreError> {
        let path = self.entry_path(JOBS_DIR, id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save_job(&self, job: &Job) -> Result<bool, StoreError> {
        let path = self.entry_path(JOBS_DIR, &job.id);
        let created = !path.exists();
        Self::write_json(&path, job)?;
        Ok(created)
    }

    fn remove_job(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.entry_path(JOBS_DIR, id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load_config()?.remove(key))
    }

    fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut config = self.load_config()?;
        config.insert(key.to_string(), value.to_string());
        Self::write_json(&self.base_path.join(CONFIG_FILE), &config)
    }

    fn config_table(&self) -> Result<HashMap<String, String>, StoreError> {
        self.load_config()
    }

    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks = Vec::new();
        for path in self.read_dir_files(TASKS_DIR)? {
            let json = fs::read_to_string(&path)?;
            match serde_json::from_str::<Task>(&json) {
                Ok(task) => tasks.push(task),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable task file");
                }
            }
        }
        Ok(tasks)
    }

    fn enqueue_task(&self, task: &Task) -> Result<(), StoreError> {
        Self::write_json(&self.entry_path(TASKS_DIR, &task.id), task)
    }

    fn remove_task(&self, id: &str) -> Result<(), StoreError> {
        let path = self.entry_path(TASKS_DIR, id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
