// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cogwork daemon (cogd)
//!
//! Background process that owns the runtime and drives one scheduling
//! pass per tick until told to stop.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use cogwork_core::SystemClock;
use cogwork_engine::{ModuleRegistry, Runtime};
use cogwork_storage::{JsonJobStore, JsonlActionLog};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = args.get(1).map(PathBuf::from);
    let config = DaemonConfig::load(config_path.as_deref())?;

    let _log_guard = setup_logging(&config)?;

    info!(data_dir = %config.data_dir.display(), "starting cogd");
    std::fs::create_dir_all(&config.data_dir)?;

    let store = Arc::new(JsonJobStore::open(&config.data_dir)?);
    let sink = Arc::new(JsonlActionLog::open(config.action_log_path())?);
    let registry = Arc::new(ModuleRegistry::with_builtins());
    let runtime = Runtime::new(
        store,
        registry,
        sink,
        Arc::new(SystemClock),
        config.runtime_config(),
    );

    let installed = runtime.install_system_jobs()?;
    if installed > 0 {
        info!(installed, "installed system registration jobs");
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut ticker = tokio::time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(interval = ?config.tick_interval, "cogd ready");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(error) = runtime.execute().await {
                    error!(%error, "scheduling pass failed");
                }
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT");
                break;
            }
        }
    }

    info!("shutting down, draining in-flight executions");
    if !runtime.close(false, config.drain_timeout).await {
        error!("drain timed out, exiting with executions still active");
    }
    info!("cogd stopped");
    Ok(())
}

fn setup_logging(
    config: &DaemonConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, std::io::Error> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let file_name = path
                .file_name()
                .ok_or_else(|| std::io::Error::other("log_file has no file name"))?;
            let directory = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(None)
        }
    }
}
