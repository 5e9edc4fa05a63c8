//! File logging with tracing.
//!
//! The terminal belongs to the TUI, so everything goes to a daily-rotated
//! file under the configured log directory. `RUST_LOG` wins over the
//! configured level when set.

use std::fs;
use anyhow::Result;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::Config;

pub const LOG_FILE_PREFIX: &str = "manuals.log";

/// Initialize the global subscriber.
///
/// Returns a guard that must be kept alive for the duration of the program.
/// Dropping the guard flushes and stops file logging.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.log_dir()?;
    fs::create_dir_all(&log_dir)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (writer, guard) = non_blocking(daily(&log_dir, LOG_FILE_PREFIX));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false) // No ANSI codes in files
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
