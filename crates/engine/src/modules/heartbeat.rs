// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::SessionContext;
use crate::module::{ActionModule, ModuleError, SystemModule};
use async_trait::async_trait;
use cogwork_core::{Action, Job, JobStore, ModuleKind};
use std::sync::Arc;

pub const HEARTBEAT_CONFIG_KEY: &str = "heartbeat::last_seen";

/// `core.heartbeat`: record liveness in the system config table
///
/// Registers its own job on first install, so a fresh store always has
/// one periodically running job.
#[derive(Default)]
pub struct Heartbeat {
    store: Option<Arc<dyn JobStore>>,
}

#[async_trait]
impl ActionModule for Heartbeat {
    fn describe(&self) -> String {
        "record engine liveness in the config table".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let now = ctx.now();
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| ModuleError::Failed("job store not bound".to_string()))?;
        store.set_config(HEARTBEAT_CONFIG_KEY, &now.to_rfc3339())?;
        ctx.log().debug("heartbeat recorded");
        Ok(true)
    }
}

impl SystemModule for Heartbeat {
    fn bind(&mut self, store: Arc<dyn JobStore>) {
        self.store = Some(store);
    }

    fn registration_job(&self) -> Option<Job> {
        let mut job = Job::new("Heartbeat")
            .with_group("system")
            .with_schedule("*/5 * * * *")
            .with_root_action(Action::new(ModuleKind::System, "core.heartbeat"));
        // Stable id keeps installation idempotent across restarts.
        job.id = "core.heartbeat".to_string();
        Some(job)
    }
}
