// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-action logger
//!
//! Each tree node gets a logger bound to its job, module, and origin.
//! Events below the configured minimum level are dropped; the rest are
//! buffered and flushed to the action-log sink when the node finishes,
//! and mirrored to `tracing` as they happen.

use cogwork_core::{ActionLogSink, Clock, Job, LogEvent, LogLevel, Origin};
use std::sync::Arc;

/// Logger bound to one executing tree node
pub struct ActionLogger {
    sink: Arc<dyn ActionLogSink>,
    clock: Arc<dyn Clock>,
    min_level: LogLevel,
    origin: Origin,
    job_id: String,
    job_name: String,
    group: String,
    module: String,
    buffer: Vec<LogEvent>,
}

impl ActionLogger {
    pub fn new(
        sink: Arc<dyn ActionLogSink>,
        clock: Arc<dyn Clock>,
        min_level: LogLevel,
        job: &Job,
        module: impl Into<String>,
        origin: Origin,
    ) -> Self {
        Self {
            sink,
            clock,
            min_level,
            origin,
            job_id: job.id.clone(),
            job_name: job.name.clone(),
            group: job.group.clone(),
            module: module.into(),
            buffer: Vec::new(),
        }
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message.into(), None);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message.into(), None);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message.into(), None);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message.into(), None);
    }

    /// Log a failure with its exception text
    pub fn error_with(&mut self, message: impl Into<String>, detail: impl Into<String>) {
        self.log(LogLevel::Error, message.into(), Some(detail.into()));
    }

    fn log(&mut self, level: LogLevel, message: String, error: Option<String>) {
        match level {
            LogLevel::Debug => {
                tracing::debug!(job = %self.job_name, module = %self.module, "{message}");
            }
            LogLevel::Info => {
                tracing::info!(job = %self.job_name, module = %self.module, "{message}");
            }
            LogLevel::Warn => {
                tracing::warn!(job = %self.job_name, module = %self.module, "{message}");
            }
            LogLevel::Error => {
                tracing::error!(
                    job = %self.job_name,
                    module = %self.module,
                    error = error.as_deref().unwrap_or(""),
                    "{message}"
                );
            }
        }

        if level < self.min_level {
            return;
        }
        self.buffer.push(LogEvent {
            timestamp: self.clock.now(),
            origin: self.origin,
            job_id: self.job_id.clone(),
            job_name: self.job_name.clone(),
            group: self.group.clone(),
            module: self.module.clone(),
            level,
            message,
            error,
        });
    }

    /// Number of buffered, not yet flushed events
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Write buffered events to the sink
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.buffer);
        self.sink.write_batch(batch);
    }
}

impl Drop for ActionLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
