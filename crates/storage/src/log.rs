// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL action log

use cogwork_core::{ActionLogSink, LogEvent, LogFilter, StoreError};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Action log backed by a JSONL file, one event per line
pub struct JsonlActionLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlActionLog {
    /// Open or create the log file at the given path
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn append(&self, event: &LogEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(%error, "dropping unserializable log event");
                return;
            }
        };
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(error) = writeln!(writer, "{line}") {
            tracing::warn!(%error, path = %self.path.display(), "action log write failed");
        }
    }
}

impl ActionLogSink for JsonlActionLog {
    fn write(&self, event: LogEvent) {
        self.append(&event);
    }

    fn write_batch(&self, batch: Vec<LogEvent>) {
        for event in &batch {
            self.append(event);
        }
        self.flush();
    }

    fn read(&self, filter: &LogFilter) -> Vec<LogEvent> {
        self.flush();
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(_) => return Vec::new(),
        };
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEvent>(&line) {
                Ok(event) if filter.matches(&event) => events.push(event),
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(%error, "skipping unreadable log line");
                }
            }
        }
        events
    }

    fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(error) = writer.flush() {
            tracing::warn!(%error, "action log flush failed");
        }
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
