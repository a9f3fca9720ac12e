// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cogwork-engine: execution and scheduling engine
//!
//! The moving parts of the orchestrator: the module registry, the
//! timer/queue-based task dispatcher, the recursive action-tree
//! executor, the event fan-out engine, and the runtime that drives one
//! scheduling pass per tick. Storage and the action-log sink stay
//! behind the `cogwork-core` traits.

mod context;
mod dispatcher;
mod events;
mod executor;
mod locks;
mod logger;
mod module;
pub mod modules;
mod registry;
mod runtime;

pub use context::SessionContext;
pub use dispatcher::{DispatchError, Dispatcher};
pub use events::EventEngine;
pub use locks::ExecutionLocks;
pub use logger::ActionLogger;
pub use module::{ActionModule, ModuleError, ParamSpec, SystemModule};
pub use registry::ModuleRegistry;
pub use runtime::{Runtime, RuntimeConfig, RuntimeError};

#[cfg(test)]
mod test_support;
