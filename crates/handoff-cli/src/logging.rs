//! Process-wide logging
//!
//! Two sinks, installed once before the first delegation:
//! - console (stderr) at INFO and above, short timestamps
//! - a per-run log file under `<working_dir>/logs` at DEBUG and above

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, time::ChronoLocal, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use handoff_core::constants::logging::{CONSOLE_TIME_FORMAT, FILE_NAME_TIME_FORMAT};
use handoff_core::paths;

/// Log file path for a run started now
pub fn log_file_path(working_dir: &Path) -> PathBuf {
    let stamp = Local::now().format(FILE_NAME_TIME_FORMAT);
    paths::logs_dir(working_dir).join(format!("handoff_{}.log", stamp))
}

/// Console sink: INFO and above, `HH:MM:SS message`
pub fn console_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_timer(ChronoLocal::new(CONSOLE_TIME_FORMAT.to_string()))
        .with_target(false)
        .with_level(false)
        .with_filter(LevelFilter::INFO)
}

/// File sink: DEBUG and above, with level and full timestamp
pub fn file_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_timer(ChronoLocal::rfc_3339())
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG)
}

/// Install the global subscriber. Returns the log file path.
pub fn init(working_dir: &Path) -> Result<PathBuf> {
    let log_dir = paths::ensure_logs_dir(working_dir)
        .with_context(|| format!("Failed to create log directory under {}", working_dir.display()))?;
    let log_path = log_file_path(working_dir);
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(console_layer(std::io::stderr))
        .with(file_layer(Mutex::new(log_file)))
        .try_init()
        .context("Logging already initialized")?;

    tracing::debug!("Log directory: {}", log_dir.display());
    tracing::info!("Logging to: {}", log_path.display());
    Ok(log_path)
}
