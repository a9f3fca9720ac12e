// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests

use crate::context::SessionContext;
use crate::module::{ActionModule, ModuleError};
use crate::runtime::{Runtime, RuntimeConfig};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use cogwork_core::{FakeClock, LogLevel};
use cogwork_storage::{MemoryActionLog, MemoryJobStore};
use std::sync::{Arc, Mutex};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

/// Shared ordered log of test-module side effects
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("trace entry not found: {entry}"))
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }
}

/// Pushes its `tag` option to the trace and forwards input records
pub struct TagModule {
    pub trace: Trace,
}

#[async_trait]
impl ActionModule for TagModule {
    fn describe(&self) -> String {
        "test tag".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        self.trace.push(ctx.require_option("tag")?.to_string());
        while let Some(record) = ctx.next_input().await {
            ctx.emit(record).await?;
        }
        Ok(true)
    }
}

/// Emits the numbers `1..=count`, tracing after each accepted send
pub struct EmitNumbers {
    pub trace: Trace,
}

#[async_trait]
impl ActionModule for EmitNumbers {
    fn describe(&self) -> String {
        "test number source".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let count: usize = ctx
            .option("count")
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        for i in 1..=count {
            ctx.emit(serde_json::json!(i)).await?;
            self.trace.push(format!("emitted {i}"));
        }
        Ok(true)
    }
}

/// Drains its input, tracing each record
pub struct ConsumeTrace {
    pub trace: Trace,
}

#[async_trait]
impl ActionModule for ConsumeTrace {
    fn describe(&self) -> String {
        "test sink".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        while let Some(record) = ctx.next_input().await {
            self.trace.push(format!("consumed {record}"));
        }
        Ok(true)
    }
}

/// Fires the event named by its `event` option
#[derive(Default)]
pub struct FireEvent;

#[async_trait]
impl ActionModule for FireEvent {
    fn describe(&self) -> String {
        "test event source".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let event = ctx.require_option("event")?.to_string();
        let data = serde_json::json!({ "from": ctx.job().name });
        ctx.emit_event(&event, &data);
        Ok(true)
    }
}

/// Submits a delayed follow-up task running `test.tag`
#[derive(Default)]
pub struct EmitFollowup;

#[async_trait]
impl ActionModule for EmitFollowup {
    fn describe(&self) -> String {
        "test follow-up source".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let tag = ctx.require_option("tag")?.to_string();
        let delay_ms: u64 = ctx
            .option("delay_ms")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let action = cogwork_core::Action::module("test.tag").with_option("tag", tag);
        ctx.emit_task(action, std::time::Duration::from_millis(delay_ms))?;
        Ok(true)
    }
}

/// Always fails
#[derive(Default)]
pub struct FailModule;

#[async_trait]
impl ActionModule for FailModule {
    fn describe(&self) -> String {
        "test failure".to_string()
    }

    async fn execute(&mut self, _ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        Err(ModuleError::Failed("boom".to_string()))
    }
}

pub struct Harness {
    pub store: Arc<MemoryJobStore>,
    pub sink: Arc<MemoryActionLog>,
    pub clock: Arc<FakeClock>,
    pub runtime: Runtime,
}

pub fn harness() -> Harness {
    harness_with(RuntimeConfig {
        min_log_level: LogLevel::Debug,
        ..RuntimeConfig::default()
    })
}

pub fn harness_with(config: RuntimeConfig) -> Harness {
    let store = Arc::new(MemoryJobStore::new());
    let sink = Arc::new(MemoryActionLog::new());
    let clock = Arc::new(FakeClock::at(base_time()));
    let registry = Arc::new(crate::registry::ModuleRegistry::with_builtins());
    let runtime = Runtime::new(
        store.clone(),
        registry,
        sink.clone(),
        clock.clone(),
        config,
    );
    Harness {
        store,
        sink,
        clock,
        runtime,
    }
}

impl Harness {
    /// Register the test module set sharing one trace
    pub fn register_test_modules(&self, trace: &Trace) {
        let registry = self.runtime.registry();
        let t = trace.clone();
        registry.register_action("test.tag", move || TagModule { trace: t.clone() });
        let t = trace.clone();
        registry.register_action("test.numbers", move || EmitNumbers { trace: t.clone() });
        let t = trace.clone();
        registry.register_action("test.sink", move || ConsumeTrace { trace: t.clone() });
        registry.register_action("test.fire", FireEvent::default);
        registry.register_action("test.followup", EmitFollowup::default);
        registry.register_action("test.fail", FailModule::default);
    }
}
