// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A named, schedulable unit owning a root action tree

use crate::action::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pseudo-event fired on the first scheduling pass after process start
pub const ON_STARTUP_EVENT: &str = "onStartUp";

/// A named, schedulable unit owning a root action tree
///
/// Jobs are created and edited by an external management surface and
/// persisted by the job store. The engine mutates a job only through
/// `mark_execution_start` and the reschedule path of the scheduling
/// model; it never deletes one. `id` is immutable once read and all
/// timestamps are UTC.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    #[serde(default = "fresh_id")]
    pub id: String,
    pub name: String,
    /// Namespace for `local.` / `this.` scoped events
    #[serde(default)]
    pub group: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ordered cron expressions; the earliest next occurrence wins
    #[serde(default)]
    pub schedules: Vec<String>,
    #[serde(default)]
    pub last_execution: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_execution: Option<DateTime<Utc>>,
    /// Event names this job listens to
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub root_action: Option<Action>,
    /// Free-form key/value options, merged into every tree node
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_enabled() -> bool {
    true
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            name: name.into(),
            group: String::new(),
            enabled: true,
            schedules: Vec::new(),
            last_execution: None,
            next_execution: None,
            events: Vec::new(),
            root_action: None,
            options: HashMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_schedule(mut self, expression: impl Into<String>) -> Self {
        self.schedules.push(expression.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn with_root_action(mut self, action: Action) -> Self {
        self.root_action = Some(action);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this job listens to the given event name (exact match,
    /// scope prefixes included)
    pub fn listens_to(&self, event: &str) -> bool {
        self.events.iter().any(|e| e == event)
    }

    /// Partial clone carrying only what re-dispatch needs: identity,
    /// group, and a replacement root action
    pub fn stub(&self, root_action: Action) -> Job {
        Job {
            id: self.id.clone(),
            name: self.name.clone(),
            group: self.group.clone(),
            enabled: self.enabled,
            schedules: Vec::new(),
            last_execution: None,
            next_execution: None,
            events: Vec::new(),
            root_action: Some(root_action),
            options: self.options.clone(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
