// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cogwork-storage: job store and action-log backends
//!
//! Two `JobStore` implementations (JSON files on disk, in-memory) and
//! matching `ActionLogSink` implementations (append-only JSONL file,
//! in-memory buffer). The engine only sees the traits from
//! `cogwork-core`; nothing here contains scheduling logic.

mod json;
mod log;
mod memory;

pub use json::JsonJobStore;
pub use log::JsonlActionLog;
pub use memory::{MemoryActionLog, MemoryJobStore};
