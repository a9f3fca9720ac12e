// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advisory execution-lock cache
//!
//! A time-bounded token is held per job id for the duration of one
//! action-tree execution. The tokens are only an existence/count
//! signal for graceful shutdown; they do not serialize executions.
//! Entries are reference counted because a job's emitted sub-tasks
//! share its id and may run concurrently with the parent tree.

use chrono::{DateTime, Duration, Utc};
use cogwork_core::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct LockEntry {
    holders: usize,
    expires_at: DateTime<Utc>,
}

/// Expiring cache of in-progress job executions
pub struct ExecutionLocks {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<String, LockEntry>>,
}

impl ExecutionLocks {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Place a token for the job; released when the guard drops
    pub fn acquire(self: &Arc<Self>, job_id: &str) -> LockToken {
        let expires_at = self.clock.now() + self.ttl;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(job_id.to_string()).or_insert(LockEntry {
            holders: 0,
            expires_at,
        });
        entry.holders += 1;
        entry.expires_at = expires_at;
        LockToken {
            locks: Arc::clone(self),
            job_id: job_id.to_string(),
        }
    }

    /// Number of jobs with a live, unexpired token
    pub fn active_count(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.expires_at > now);
        entries.len()
    }

    fn release(&self, job_id: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(job_id) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                entries.remove(job_id);
            }
        }
    }

    /// Wait until no executions are active, up to `timeout`
    pub async fn wait_idle(&self, timeout: std::time::Duration) -> bool {
        let poll = std::time::Duration::from_millis(25);
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.active_count() == 0 {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(poll).await;
        }
    }
}

/// RAII token for one in-progress execution
pub struct LockToken {
    locks: Arc<ExecutionLocks>,
    job_id: String,
}

impl Drop for LockToken {
    fn drop(&mut self) {
        self.locks.release(&self.job_id);
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
