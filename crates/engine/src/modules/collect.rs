// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::SessionContext;
use crate::module::{ActionModule, ModuleError};
use async_trait::async_trait;

/// `core.collect`: drain and log the input
///
/// Useful as the terminal node of a pipeline or as the consumer branch
/// of a concurrent producer.
#[derive(Default)]
pub struct CollectRecords;

#[async_trait]
impl ActionModule for CollectRecords {
    fn describe(&self) -> String {
        "drain input records into the action log".to_string()
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let mut count = 0usize;
        while let Some(record) = ctx.next_input().await {
            ctx.log().debug(format!("record: {record}"));
            count += 1;
        }
        ctx.log().info(format!("collected {count} records"));
        Ok(true)
    }
}
