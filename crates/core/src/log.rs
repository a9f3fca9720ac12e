// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action-log data model and sink contract
//!
//! Every tree node binds a logger that buffers `LogEvent`s and flushes
//! them to a pluggable sink. The sink is an external collaborator; the
//! engine only depends on this trait.

use crate::task::Origin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity, ordered so a minimum level can gate writes
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// One structured entry in the action log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub origin: Origin,
    pub job_id: String,
    pub job_name: String,
    pub group: String,
    pub module: String,
    pub level: LogLevel,
    pub message: String,
    /// Exception text of a failed node, when present
    #[serde(default)]
    pub error: Option<String>,
}

/// Filters for reading back log events
#[derive(Clone, Debug, Default)]
pub struct LogFilter {
    pub job_id: Option<String>,
    pub min_level: Option<LogLevel>,
    pub since: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn matches(&self, event: &LogEvent) -> bool {
        if let Some(job_id) = &self.job_id {
            if &event.job_id != job_id {
                return false;
            }
        }
        if let Some(min) = self.min_level {
            if event.level < min {
                return false;
            }
        }
        if let Some(since) = self.since {
            if event.timestamp < since {
                return false;
            }
        }
        true
    }
}

/// Sink for structured action-log events
pub trait ActionLogSink: Send + Sync {
    fn write(&self, event: LogEvent);

    fn write_batch(&self, batch: Vec<LogEvent>) {
        for event in batch {
            self.write(event);
        }
    }

    fn read(&self, filter: &LogFilter) -> Vec<LogEvent>;

    fn flush(&self) {}
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
