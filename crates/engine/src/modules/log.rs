// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::SessionContext;
use crate::module::{ActionModule, ModuleError, ParamSpec};
use async_trait::async_trait;
use cogwork_core::LogLevel;

/// `core.log`: write one message to the action log
///
/// Input records pass through unchanged, so the module can sit
/// anywhere in a pipeline.
#[derive(Default)]
pub struct LogMessage;

#[async_trait]
impl ActionModule for LogMessage {
    fn describe(&self) -> String {
        "write a message to the action log".to_string()
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("message", "the message to log"),
            ParamSpec::optional("level", "debug, info, warn, or error (default info)"),
        ]
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let message = ctx.require_option("message")?.to_string();
        let level = match ctx.option("level") {
            Some(raw) => raw.parse::<LogLevel>().map_err(ModuleError::Failed)?,
            None => LogLevel::Info,
        };
        match level {
            LogLevel::Debug => ctx.log().debug(message),
            LogLevel::Info => ctx.log().info(message),
            LogLevel::Warn => ctx.log().warn(message),
            LogLevel::Error => ctx.log().error(message),
        }
        while let Some(record) = ctx.next_input().await {
            ctx.emit(record).await?;
        }
        Ok(true)
    }
}
