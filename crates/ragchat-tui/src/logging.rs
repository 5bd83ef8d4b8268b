//! File logging. The terminal belongs to the UI, so events go to
//! `<data_local_dir>/ragchat/logs/ragchat.log` instead of stderr.

use std::path::PathBuf;
use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ragchat").join("logs"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Start the subscriber. `RUST_LOG` wins over `-v`. Keep the guard alive for
/// the whole run or buffered lines are lost.
pub fn init(verbose: u8) -> Result<WorkerGuard> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    let file_appender = tracing_appender::rolling::never(&dir, "ragchat.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {}", e))?;

    Ok(guard)
}
