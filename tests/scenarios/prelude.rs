//! Shared fixtures for the scenario tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use cogwork_engine::{ActionModule, ModuleError, ModuleRegistry, Runtime, RuntimeConfig, SessionContext};
use cogwork_core::{FakeClock, LogLevel};
pub use cogwork_core::{Clock, JobStore};
use cogwork_storage::{MemoryActionLog, MemoryJobStore};
use std::sync::{Arc, Mutex};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

/// Shared ordered log of module side effects
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("trace entry not found: {entry}"))
    }
}

/// Pushes its `tag` option and forwards input records
pub struct TagModule {
    pub trace: Trace,
}

#[async_trait]
impl ActionModule for TagModule {
    fn describe(&self) -> String {
        "scenario tag".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        self.trace.push(ctx.require_option("tag")?.to_string());
        while let Some(record) = ctx.next_input().await {
            ctx.emit(record).await?;
        }
        Ok(true)
    }
}

/// Emits the numbers `1..=count`, tracing each accepted send
pub struct NumberSource {
    pub trace: Trace,
}

#[async_trait]
impl ActionModule for NumberSource {
    fn describe(&self) -> String {
        "scenario number source".to_string()
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
pub struct RecordSink {
    pub trace: Trace,
}

#[async_trait]
impl ActionModule for RecordSink {
    fn describe(&self) -> String {
        "scenario sink".to_string()
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
pub struct EventSource;

#[async_trait]
impl ActionModule for EventSource {
    fn describe(&self) -> String {
        "scenario event source".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let event = ctx.require_option("event")?.to_string();
        let data = serde_json::json!({ "from": ctx.job().name });
        ctx.emit_event(&event, &data);
        Ok(true)
    }
}

pub struct Scene {
    pub store: Arc<MemoryJobStore>,
    pub sink: Arc<MemoryActionLog>,
    pub clock: Arc<FakeClock>,
    pub runtime: Runtime,
    pub trace: Trace,
}

pub fn scene() -> Scene {
    let store = Arc::new(MemoryJobStore::new());
    let sink = Arc::new(MemoryActionLog::new());
    let clock = Arc::new(FakeClock::at(base_time()));
    let registry = Arc::new(ModuleRegistry::with_builtins());
    let trace = Trace::default();

    let t = trace.clone();
    registry.register_action("scenario.tag", move || TagModule { trace: t.clone() });
    let t = trace.clone();
    registry.register_action("scenario.numbers", move || NumberSource { trace: t.clone() });
    let t = trace.clone();
    registry.register_action("scenario.sink", move || RecordSink { trace: t.clone() });
    registry.register_action("scenario.fire", EventSource::default);

    let runtime = Runtime::new(
        store.clone(),
        registry,
        sink.clone(),
        clock.clone(),
        RuntimeConfig {
            min_log_level: LogLevel::Debug,
            ..RuntimeConfig::default()
        },
    );
    Scene {
        store,
        sink,
        clock,
        runtime,
        trace,
    }
}

/// Poll until the trace contains `entry`; panics after two (virtual)
/// minutes
pub async fn wait_for(trace: &Trace, entry: &str) {
    tokio::time::timeout(std::time::Duration::from_secs(120), async {
        while !trace.contains(entry) {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for trace entry: {entry}"));
}
