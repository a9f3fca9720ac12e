// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration
//!
//! Loaded from an optional TOML file; every field has a default so an
//! empty file (or none at all) yields a working daemon.

use cogwork_core::{LogLevel, Thresholds};
use cogwork_engine::RuntimeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Directory holding jobs, the config table, and the task queue
    pub data_dir: PathBuf,
    /// Interval between scheduling passes
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Near-due window of the scheduling model
    #[serde(with = "humantime_serde")]
    pub high_threshold: Duration,
    /// Overdue window of the scheduling model
    #[serde(with = "humantime_serde")]
    pub low_threshold: Duration,
    /// Minimum level written to the action log
    pub min_log_level: LogLevel,
    /// Action-log file; relative paths are under `data_dir`
    pub action_log: PathBuf,
    /// Daemon log file; stderr when unset
    pub log_file: Option<PathBuf>,
    /// How long shutdown waits for in-flight executions
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("cogwork-data"),
            tick_interval: Duration::from_secs(30),
            high_threshold: Duration::from_secs(45),
            low_threshold: Duration::from_secs(15 * 60),
            min_log_level: LogLevel::Info,
            action_log: PathBuf::from("actions.jsonl"),
            log_file: None,
            drain_timeout: Duration::from_secs(30),
        }
    }
}

impl DaemonConfig {
    /// Load from `path`, or from `cogd.toml` in the working directory
    /// if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from("cogd.toml");
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let raw = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn action_log_path(&self) -> PathBuf {
        if self.action_log.is_absolute() {
            self.action_log.clone()
        } else {
            self.data_dir.join(&self.action_log)
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let defaults = Thresholds::default();
        RuntimeConfig {
            thresholds: Thresholds {
                high: chrono::Duration::from_std(self.high_threshold)
                    .unwrap_or(defaults.high),
                low: chrono::Duration::from_std(self.low_threshold).unwrap_or(defaults.low),
            },
            min_log_level: self.min_log_level,
            ..RuntimeConfig::default()
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
