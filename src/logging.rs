//! Tracing setup.
//!
//! Tables and prompts own stdout, so log records go to a daily rolling file
//! under the local data directory (`~/.local/share/tabula/logs/` on Linux).
//! `RUST_LOG` overrides the default filter.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_FILTER: &str = "tabula=info,warn";
const LOG_FILE_PREFIX: &str = "tabula.log";

/// Install the global subscriber.
///
/// Fails if the data directory is unknown or not writable, or if a
/// subscriber is already installed. The binary carries on without logs.
pub fn init() -> anyhow::Result<()> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("could not create {}", log_dir.display()))?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %log_dir.display(),
        "tabula starting"
    );
    Ok(())
}

/// Directory holding the rolling log files.
fn log_directory() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir().context("could not determine local data directory")?;
    Ok(base.join("tabula").join("logs"))
}

/// Mark the end of a run in the log.
pub fn shutdown() {
    tracing::info!("tabula exiting");
}
