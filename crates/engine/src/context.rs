// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node execution context
//!
//! A `SessionContext` is handed to each executing tree node. It carries
//! the resolved options, the node's input records, and the channels for
//! everything the node may emit: records to the next node (or to a
//! concurrent-consumer branch), events to the fan-out engine, and
//! delayed follow-up tasks to the dispatcher.

use crate::dispatcher::Dispatcher;
use crate::logger::ActionLogger;
use crate::module::ModuleError;
use chrono::{DateTime, Utc};
use cogwork_core::{Action, Job, Origin, Record, RecordStream, Task};
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;

/// Where a node's input records come from
pub(crate) enum NodeInput {
    /// Finalized output of the previous node (or the task payload)
    Buffered(VecDeque<Record>),
    /// Live channel feeding a concurrent-consumer task
    Stream(RecordStream),
}

/// Where a node's emitted records go
enum NodeOutput {
    Buffered(VecDeque<Record>),
    Bounded(mpsc::Sender<Record>),
    Unbounded(mpsc::UnboundedSender<Record>),
}

/// A child flagged to consume this node's records concurrently
pub(crate) struct ConsumerSpec {
    pub action: Action,
    /// Bounded channel capacity; `None` selects an unbounded channel
    pub limit: Option<usize>,
}

/// Execution context of one tree node
pub struct SessionContext {
    dispatcher: Dispatcher,
    task_id: String,
    job: Job,
    origin: Origin,
    task_options: HashMap<String, String>,
    options: HashMap<String, String>,
    input: Option<NodeInput>,
    output: NodeOutput,
    consumer: Option<ConsumerSpec>,
    logger: ActionLogger,
}

impl SessionContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        dispatcher: Dispatcher,
        task_id: String,
        job: Job,
        origin: Origin,
        task_options: HashMap<String, String>,
        options: HashMap<String, String>,
        input: Option<NodeInput>,
        consumer: Option<ConsumerSpec>,
        logger: ActionLogger,
    ) -> Self {
        Self {
            dispatcher,
            task_id,
            job,
            origin,
            task_options,
            options,
            input,
            output: NodeOutput::Buffered(VecDeque::new()),
            consumer,
            logger,
        }
    }

    /// Id of the task this node runs under
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Current time per the engine clock
    pub fn now(&self) -> DateTime<Utc> {
        self.dispatcher.now()
    }

    /// Resolved option value for this node
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn require_option(&self, key: &str) -> Result<&str, ModuleError> {
        self.option(key)
            .ok_or_else(|| ModuleError::MissingOption(key.to_string()))
    }

    pub fn options(&self) -> &HashMap<String, String> {
        &self.options
    }

    pub fn log(&mut self) -> &mut ActionLogger {
        &mut self.logger
    }

    /// Pull the next input record
    ///
    /// Buffered input drains the previous node's output; stream input
    /// waits on the producer and ends when it finalizes.
    pub async fn next_input(&mut self) -> Option<Record> {
        match self.input.as_mut()? {
            NodeInput::Buffered(queue) => queue.pop_front(),
            NodeInput::Stream(stream) => stream.next().await,
        }
    }

    /// Emit a record to this node's output
    ///
    /// Without a concurrent-consumer branch the record is buffered and
    /// handed to the next node when this one finishes. With one, the
    /// first emit starts the consumer task and every record goes over
    /// its channel; a bounded channel applies backpressure here.
    pub async fn emit(&mut self, record: Record) -> Result<(), ModuleError> {
        if self.consumer.is_some() && matches!(self.output, NodeOutput::Buffered(_)) {
            self.start_consumer()?;
        }
        match &mut self.output {
            NodeOutput::Buffered(queue) => {
                queue.push_back(record);
                Ok(())
            }
            NodeOutput::Bounded(tx) => tx
                .send(record)
                .await
                .map_err(|_| ModuleError::ConsumerClosed),
            NodeOutput::Unbounded(tx) => {
                tx.send(record).map_err(|_| ModuleError::ConsumerClosed)
            }
        }
    }

    fn start_consumer(&mut self) -> Result<(), ModuleError> {
        let Some(spec) = self.consumer.take() else {
            return Ok(());
        };
        let (stream, output) = match spec.limit {
            Some(capacity) => {
                let (tx, rx) = mpsc::channel(capacity);
                (RecordStream::Bounded(rx), NodeOutput::Bounded(tx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (RecordStream::Unbounded(rx), NodeOutput::Unbounded(tx))
            }
        };
        let task = Task::new(
            self.job.stub(spec.action),
            self.dispatcher.now(),
            Origin::ConcurrentConsumer,
        )
        .with_options(self.task_options.clone())
        .with_stream(stream);
        self.dispatcher
            .try_add_task(task)
            .map_err(|e| ModuleError::Dispatch(e.to_string()))?;
        self.output = output;
        Ok(())
    }

    /// Fire an event; returns how many handler tasks were dispatched
    ///
    /// Fire-and-forget: rejected handler tasks are logged and dropped,
    /// the firing node never waits on them.
    pub fn emit_event(&mut self, name: &str, data: &Record) -> usize {
        let tasks = self.dispatcher.events().fire_event(name, data, &self.job);
        let mut dispatched = 0;
        for task in tasks {
            match self.dispatcher.try_add_task(task) {
                Ok(()) => dispatched += 1,
                Err(error) => {
                    tracing::debug!(event = name, %error, "handler task rejected");
                }
            }
        }
        dispatched
    }

    /// Submit a follow-up task running `action` after `delay`
    ///
    /// The task reuses this job's identity, so graceful shutdown counts
    /// it against the same execution lock.
    pub fn emit_task(
        &mut self,
        action: Action,
        delay: std::time::Duration,
    ) -> Result<String, ModuleError> {
        let start = chrono::Duration::from_std(delay)
            .ok()
            .and_then(|d| self.dispatcher.now().checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let task = Task::new(self.job.stub(action), start, Origin::EmittedTask)
            .with_options(self.task_options.clone());
        let id = task.id.clone();
        self.dispatcher
            .try_add_task(task)
            .map_err(|e| ModuleError::Dispatch(e.to_string()))?;
        Ok(id)
    }

    /// Close the node: drop any live output channel (ending a consumer
    /// stream) and hand back whatever was buffered
    pub(crate) fn finish(mut self) -> VecDeque<Record> {
        let output = std::mem::replace(&mut self.output, NodeOutput::Buffered(VecDeque::new()));
        self.logger.flush();
        match output {
            NodeOutput::Buffered(queue) => queue,
            NodeOutput::Bounded(_) | NodeOutput::Unbounded(_) => VecDeque::new(),
        }
    }
}
