// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-due decision state machine
//!
//! Pure functions over a job's cron expressions and last/next execution
//! timestamps. The dispatcher and runtime call these; nothing here does
//! I/O or touches the store.

use crate::job::Job;
use chrono::{DateTime, Duration, Utc};
use cron::Schedule;
use std::str::FromStr;

/// Outcome of evaluating whether a job is due
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// Not due, disabled, or nothing to run
    None,
    /// Due now; the caller should submit a task
    ShouldExecute,
    /// `next_execution` was recomputed; the caller must persist the job
    Rescheduled,
}

/// The near-due and overdue windows of the scheduling model
#[derive(Clone, Copy, Debug)]
pub struct Thresholds {
    /// Jobs due within `now + high` are near due
    pub high: Duration,
    /// Jobs overdue beyond `now - low` are considered missed
    pub low: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: Duration::seconds(45),
            low: Duration::minutes(15),
        }
    }
}

impl Thresholds {
    /// Decide whether `job` should run at `now`
    ///
    /// May recompute `job.next_execution` on the overdue path; when the
    /// result is `Rescheduled` the caller must persist the job.
    pub fn evaluate(&self, job: &mut Job, now: DateTime<Utc>) -> ScheduleDecision {
        if !job.enabled || job.root_action.is_none() {
            return ScheduleDecision::None;
        }

        let high_threshold = now + self.high;
        let low_threshold = now - self.low;

        // A job that has never been scheduled counts as overdue: it
        // either gets a first next_execution computed or never runs.
        let next = job.next_execution.unwrap_or(DateTime::<Utc>::MIN_UTC);

        if next > high_threshold {
            return ScheduleDecision::None;
        }

        if next > low_threshold {
            return ScheduleDecision::ShouldExecute;
        }

        // Overdue beyond the low threshold: the due time was missed.
        if job.schedules.is_empty() {
            return ScheduleDecision::None;
        }

        let recomputed = calculate_next_execution(&job.schedules, now);
        job.next_execution = recomputed;
        match recomputed {
            Some(t) if t <= high_threshold => ScheduleDecision::ShouldExecute,
            Some(_) => ScheduleDecision::Rescheduled,
            None => ScheduleDecision::None,
        }
    }
}

/// Earliest occurrence at or after `after` across all expressions
///
/// Invalid expressions are skipped per-expression; an empty result is
/// the "never" sentinel.
pub fn calculate_next_execution(
    schedules: &[String],
    after: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    schedules
        .iter()
        .filter_map(|expr| parse_schedule(expr))
        .filter_map(|schedule| schedule.after(&after).next())
        .min()
}

/// Record the start of an execution and compute the next due time
///
/// If the cron set would fire again within `thresholds.high` of the
/// start, the next occurrence is computed relative to
/// `last_execution + high` instead, preventing tight self-retriggering.
pub fn mark_execution_start(job: &mut Job, now: DateTime<Utc>, thresholds: &Thresholds) {
    job.last_execution = Some(now);

    let mut next = calculate_next_execution(&job.schedules, now);
    if let Some(t) = next {
        if t - now < thresholds.high {
            next = calculate_next_execution(&job.schedules, now + thresholds.high);
        }
    }
    job.next_execution = next;
}

/// Parse a cron expression, tolerating the common 5-field form
///
/// The `cron` crate wants a seconds field; standard 5-field expressions
/// get `0` prepended. Invalid expressions yield `None` and a warning.
fn parse_schedule(expression: &str) -> Option<Schedule> {
    let expression = expression.trim();
    let normalized = if expression.split_whitespace().count() == 5 {
        format!("0 {expression}")
    } else {
        expression.to_string()
    };
    match Schedule::from_str(&normalized) {
        Ok(schedule) => Some(schedule),
        Err(error) => {
            tracing::warn!(expression, %error, "skipping invalid cron expression");
            None
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
