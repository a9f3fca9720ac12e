// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive action-tree executor
//!
//! Nodes run depth-first in definition order. Each node receives the
//! finalized record buffer of the node before it (the task payload for
//! the root), executes its module, and hands its own buffer onward. A
//! failed node aborts its subtree; siblings of the failure still run
//! with the failed node's buffer.
//!
//! One child per node may be flagged as a concurrent-consumer branch.
//! That child is skipped in the sequential walk; it runs as its own
//! task wired to the parent's live output channel.

use crate::context::{ConsumerSpec, NodeInput, SessionContext};
use crate::dispatcher::Dispatcher;
use crate::module::{ActionModule, ModuleError, SystemModule};
use cogwork_core::{resolve_options, Action, ModuleKind, Record, Task};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

enum Resolved {
    Action(Box<dyn ActionModule>),
    System(Box<dyn SystemModule>),
}

/// Execute a task's whole action tree
pub(crate) async fn run_tree(dispatcher: &Dispatcher, task: &mut Task) -> VecDeque<Record> {
    let Some(root) = task.job.root_action.clone() else {
        tracing::warn!(job = %task.job.name, "task has no root action");
        return VecDeque::new();
    };
    let input = match task.stream.take() {
        Some(stream) => NodeInput::Stream(stream),
        None => NodeInput::Buffered(task.payload.drain(..).collect()),
    };
    execute_node(dispatcher, task, root, input).await
}

fn execute_node<'a>(
    dispatcher: &'a Dispatcher,
    task: &'a mut Task,
    mut action: Action,
    input: NodeInput,
) -> Pin<Box<dyn Future<Output = VecDeque<Record>> + Send + 'a>> {
    Box::pin(async move {
        action.merge_job_options(&task.job.options);
        let system = dispatcher.system_options();
        let mut options = resolve_options(&action.options, &task.job.options, &system);
        // Execution-scoped overlay wins over every stored layer.
        for (key, value) in &task.options {
            options.insert(key.clone(), value.clone());
        }

        let consumer_index = action.concurrent_child();
        let consumer = consumer_index.map(|i| ConsumerSpec {
            action: action.actions[i].clone(),
            limit: action.actions[i].queue_limit(),
        });

        let mut ctx = SessionContext::new(
            dispatcher.clone(),
            task.id.clone(),
            task.job.clone(),
            task.origin,
            task.options.clone(),
            options,
            Some(input),
            consumer,
            dispatcher.node_logger(&task.job, &action.module, task.origin),
        );

        let succeeded = match resolve_module(dispatcher, &action) {
            Some(mut module) => match module.execute(&mut ctx).await {
                Ok(true) => true,
                Ok(false) => {
                    ctx.log().warn("module reported failure");
                    task.error = Some(format!("module '{}' reported failure", action.module));
                    false
                }
                Err(error) => {
                    ctx.log().error_with("action failed", error.to_string());
                    task.error = Some(error.to_string());
                    false
                }
            },
            None => {
                let error = ModuleError::NotFound(action.module.clone());
                ctx.log().error(error.to_string());
                task.error = Some(error.to_string());
                false
            }
        };

        // Dropping the context closes any live consumer channel.
        let mut carry = ctx.finish();

        if !succeeded {
            return carry;
        }
        for (index, child) in action.actions.into_iter().enumerate() {
            if Some(index) == consumer_index {
                continue;
            }
            carry = execute_node(dispatcher, task, child, NodeInput::Buffered(carry)).await;
        }
        carry
    })
}

fn resolve_module(dispatcher: &Dispatcher, action: &Action) -> Option<Resolved> {
    match action.kind {
        ModuleKind::Action => dispatcher
            .registry()
            .resolve_action(&action.module)
            .map(Resolved::Action),
        ModuleKind::System => dispatcher
            .registry()
            .resolve_system(&action.module)
            .map(|mut module| {
                module.bind(dispatcher.store().clone());
                Resolved::System(module)
            }),
    }
}

impl Resolved {
    async fn execute(&mut self, ctx: &mut SessionContext) -> Result<bool, ModuleError> {
        match self {
            Resolved::Action(module) => module.execute(ctx).await,
            Resolved::System(module) => module.execute(ctx).await,
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
