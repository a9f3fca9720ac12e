// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cogwork-core: data model and scheduling model for the Cogwork orchestrator
//!
//! This crate provides:
//! - The `Job` / `Action` / `Task` data model
//! - The pure job-due state machine (`Thresholds::evaluate`)
//! - Option resolution with placeholder conventions
//! - The collaborator contracts the engine is written against
//!   (`JobStore`, `ActionLogSink`)

pub mod action;
pub mod clock;
pub mod job;
pub mod log;
pub mod options;
pub mod schedule;
pub mod store;
pub mod task;

// Re-exports
pub use action::{Action, ModuleKind};
pub use clock::{Clock, FakeClock, SystemClock};
pub use job::{Job, ON_STARTUP_EVENT};
pub use log::{ActionLogSink, LogEvent, LogFilter, LogLevel};
pub use options::resolve_options;
pub use schedule::{calculate_next_execution, mark_execution_start, ScheduleDecision, Thresholds};
pub use store::{JobStore, StoreError};
pub use task::{Origin, Record, RecordStream, Task};
