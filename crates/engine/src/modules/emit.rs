// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::context::SessionContext;
use crate::module::{ActionModule, ModuleError, ParamSpec};
use async_trait::async_trait;
use cogwork_core::Record;

/// `core.emit`: emit a fixed set of records
///
/// The `records` option is either a JSON array (each element becomes a
/// record) or a comma-separated list emitted as strings.
#[derive(Default)]
pub struct EmitRecords;

#[async_trait]
impl ActionModule for EmitRecords {
    fn describe(&self) -> String {
        "emit a configured set of records".to_string()
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "records",
            "JSON array, or comma-separated strings",
        )]
    }

    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        let raw = ctx.require_option("records")?.to_string();
        let records: Vec<Record> = match serde_json::from_str::<Record>(&raw) {
            Ok(Record::Array(items)) => items,
            Ok(value) => vec![value],
            Err(_) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Record::String(s.to_string()))
                .collect(),
        };
        let count = records.len();
        for record in records {
            ctx.emit(record).await?;
        }
        ctx.log().debug(format!("emitted {count} records"));
        Ok(true)
    }
}
