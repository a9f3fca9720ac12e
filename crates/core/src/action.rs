// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One node of a job's execution tree, bound to a plugin module

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which registry a module name resolves against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    /// A regular pluggable action module
    Action,
    /// A system module (gets the job store bound before execution)
    System,
}

/// One node of a job's action tree
///
/// Actions form a tree, not a DAG: every child is owned exclusively by
/// its parent and lives exactly as long as the job definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    #[serde(default = "default_kind")]
    pub kind: ModuleKind,
    /// Logical plugin name, e.g. `core.log`
    pub module: String,
    /// Ordered child actions
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Free-form key/value options
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_kind() -> ModuleKind {
    ModuleKind::Action
}

/// Option key marking a child as the concurrent-consumer branch
pub const CONCURRENT_CONSUMER: &str = "behavior::concurrentConsumer";
/// Option key for the bounded-queue capacity of the concurrent branch
pub const CONCURRENT_CONSUMER_QUEUE_LIMIT: &str = "behavior::concurrentConsumerQueueLimit";

const DEFAULT_QUEUE_LIMIT: i64 = 10;

impl Action {
    pub fn new(kind: ModuleKind, module: impl Into<String>) -> Self {
        Self {
            kind,
            module: module.into(),
            actions: Vec::new(),
            options: HashMap::new(),
        }
    }

    /// Shorthand for a regular action-module node
    pub fn module(name: impl Into<String>) -> Self {
        Self::new(ModuleKind::Action, name)
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Whether this node is flagged as a concurrent-consumer branch
    pub fn is_concurrent_consumer(&self) -> bool {
        self.options
            .get(CONCURRENT_CONSUMER)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Bounded-queue capacity for the concurrent branch
    ///
    /// `None` means unbounded (a configured limit ≤ 0). Missing or
    /// unparseable values fall back to the default of 10.
    pub fn queue_limit(&self) -> Option<usize> {
        let raw = self
            .options
            .get(CONCURRENT_CONSUMER_QUEUE_LIMIT)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_QUEUE_LIMIT);
        usize::try_from(raw).ok().filter(|n| *n > 0)
    }

    /// Index of the child flagged as the concurrent-consumer branch
    ///
    /// At most one child may carry the flag; extra flags are ignored
    /// with a warning (first wins).
    pub fn concurrent_child(&self) -> Option<usize> {
        let mut flagged = self
            .actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_concurrent_consumer());
        let first = flagged.next().map(|(i, _)| i)?;
        if flagged.next().is_some() {
            tracing::warn!(
                module = %self.module,
                "multiple children flagged as concurrent consumer, using the first"
            );
        }
        Some(first)
    }

    /// Merge job-level options into this node without overriding
    /// action-local values (action > job precedence).
    pub fn merge_job_options(&mut self, job_options: &HashMap<String, String>) {
        for (key, value) in job_options {
            self.options
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
