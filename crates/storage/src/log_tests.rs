// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use cogwork_core::{LogLevel, Origin};

fn event(level: LogLevel, message: &str) -> LogEvent {
    LogEvent {
        timestamp: Utc::now(),
        origin: Origin::EventHandler,
        job_id: "j-1".to_string(),
        job_name: "j".to_string(),
        group: "g".to_string(),
        module: "core.log".to_string(),
        level,
        message: message.to_string(),
        error: None,
    }
}

#[test]
fn write_then_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let log = JsonlActionLog::open(dir.path().join("actions.jsonl")).unwrap();

    log.write(event(LogLevel::Info, "one"));
    log.write(event(LogLevel::Error, "two"));

    let all = log.read(&LogFilter::default());
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].message, "one");
    assert_eq!(all[1].message, "two");
}

#[test]
fn read_applies_filters() {
    let dir = tempfile::tempdir().unwrap();
    let log = JsonlActionLog::open(dir.path().join("actions.jsonl")).unwrap();

    log.write(event(LogLevel::Debug, "noise"));
    log.write(event(LogLevel::Warn, "signal"));

    let warnings = log.read(&LogFilter {
        min_level: Some(LogLevel::Warn),
        ..Default::default()
    });
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "signal");
}

#[test]
fn batch_write_is_flushed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actions.jsonl");
    let log = JsonlActionLog::open(&path).unwrap();

    log.write_batch(vec![event(LogLevel::Info, "a"), event(LogLevel::Info, "b")]);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 2);
}

#[test]
fn events_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actions.jsonl");
    {
        let log = JsonlActionLog::open(&path).unwrap();
        log.write(event(LogLevel::Info, "persisted"));
        log.flush();
    }
    let log = JsonlActionLog::open(&path).unwrap();
    let all = log.read(&LogFilter::default());
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].message, "persisted");
}

#[test]
fn corrupt_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actions.jsonl");
    {
        let log = JsonlActionLog::open(&path).unwrap();
        log.write(event(LogLevel::Info, "good"));
        log.flush();
    }
    use std::io::Write as _;
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{broken").unwrap();

    let log = JsonlActionLog::open(&path).unwrap();
    assert_eq!(log.read(&LogFilter::default()).len(), 1);
}
