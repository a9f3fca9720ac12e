// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One scheduled or queued attempt to execute a job's action tree

use crate::job::Job;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;

/// A record flowing between tree nodes
pub type Record = serde_json::Value;

/// Why a task was created
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Due per the job's cron schedules
    Scheduler,
    /// Submitted by the management surface ("run now")
    Request,
    /// Fired by the event fan-out engine
    EventHandler,
    /// Created by an action calling `emit_task`
    EmittedTask,
    /// The designated concurrent-consumer branch of a node
    ConcurrentConsumer,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Origin::Scheduler => "scheduler",
            Origin::Request => "request",
            Origin::EventHandler => "event-handler",
            Origin::EmittedTask => "emitted-task",
            Origin::ConcurrentConsumer => "concurrent-consumer",
        };
        write!(f, "{s}")
    }
}

/// Live record stream wired into a task's root node
///
/// Bounded streams provide backpressure for the concurrent-consumer
/// branch; a configured queue limit ≤ 0 selects the unbounded variant.
#[derive(Debug)]
pub enum RecordStream {
    Bounded(mpsc::Receiver<Record>),
    Unbounded(mpsc::UnboundedReceiver<Record>),
}

impl RecordStream {
    /// Pull the next record, waiting until one is available or the
    /// producer signals completion
    pub async fn next(&mut self) -> Option<Record> {
        match self {
            RecordStream::Bounded(rx) => rx.recv().await,
            RecordStream::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// One scheduled or queued attempt to execute a job's action tree
///
/// Tasks are ephemeral: created by the dispatcher, the event engine, or
/// an action emitting work, and destroyed once the tree finishes or the
/// task is persisted to the overflow queue. The embedded job may be a
/// partial stub carrying only identity and a root action.
#[derive(Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub job: Job,
    /// UTC due time
    pub start: DateTime<Utc>,
    pub origin: Origin,
    /// Execution-scoped key/value overlay
    #[serde(default)]
    pub options: HashMap<String, String>,
    /// Records delivered to the root node's input (event payloads)
    #[serde(default)]
    pub payload: Vec<Record>,
    /// Last action failure message
    #[serde(default)]
    pub error: Option<String>,
    /// Live input stream for concurrent-consumer tasks; never persisted
    #[serde(skip)]
    pub stream: Option<RecordStream>,
}

impl Task {
    pub fn new(job: Job, start: DateTime<Utc>, origin: Origin) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            job,
            start,
            origin,
            options: HashMap::new(),
            payload: Vec::new(),
            error: None,
            stream: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_payload(mut self, payload: Vec<Record>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_stream(mut self, stream: RecordStream) -> Self {
        self.stream = Some(stream);
        self
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
