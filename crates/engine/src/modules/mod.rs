// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builtin module set
//!
//! A small set of always-available modules under the `core.` prefix.
//! Embedders register their own modules next to these.

mod collect;
mod emit;
mod heartbeat;
mod log;

pub use collect::CollectRecords;
pub use emit::EmitRecords;
pub use heartbeat::{Heartbeat, HEARTBEAT_CONFIG_KEY};
pub use log::LogMessage;

use crate::registry::ModuleRegistry;

/// Register every builtin module
pub fn register_builtins(registry: &ModuleRegistry) {
    registry.register_action("core.log", LogMessage::default);
    registry.register_action("core.emit", EmitRecords::default);
    registry.register_action("core.collect", CollectRecords::default);
    registry.register_system("core.heartbeat", Heartbeat::default);
}
