// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin module contracts
//!
//! An action module is one executable node of a job tree. A system
//! module additionally gets the job store bound before execution and
//! may self-register a default job on first load.

use crate::context::SessionContext;
use async_trait::async_trait;
use cogwork_core::{Job, JobStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Declared parameter of a module, for the management surface
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub required: bool,
    pub description: String,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            description: description.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module not found: {0}")]
    NotFound(String),
    #[error("missing required option: {0}")]
    MissingOption(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("consumer branch stopped accepting records")]
    ConsumerClosed,
    #[error("dispatch rejected: {0}")]
    Dispatch(String),
    #[error("{0}")]
    Failed(String),
}

/// One executable node of a job's action tree
///
/// Returning `Ok(false)` or an error marks the node as failed and
/// aborts its own subtree; siblings are unaffected.
#[async_trait]
pub trait ActionModule: Send {
    fn describe(&self) -> String;

    fn parameters(&self) -> Vec<ParamSpec> {
        Vec::new()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError>;
}

/// An action module with access to the job store
pub trait SystemModule: ActionModule {
    /// Receive the job store before execution
    fn bind(&mut self, store: Arc<dyn JobStore>);

    /// A default job to persist on first load, if any
    ///
    /// Registration jobs must carry a stable id so repeated startups
    /// do not re-create them.
    fn registration_job(&self) -> Option<Job> {
        None
    }
}
