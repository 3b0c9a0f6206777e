//! Logging system initialization
//!
//! The terminal belongs to the TUI, so log output goes to
//! `<config dir>/countdown.log` instead of stdout.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{CountdownError, Result};

pub const LOG_FILE_PREFIX: &str = "countdown";

/// Initialize the logging system
///
/// `RUST_LOG` wins over `default_level` when set.
pub fn init_logging(dir: &Path, default_level: &str) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .map_err(|e| CountdownError::Logging(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("countdown={default_level}"))),
        )
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CountdownError::Logging(Box::new(e)))?;

    tracing::info!("countdown v{} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Like [`init_logging`], but a failure only costs the log file.
///
/// Returns `false` when file logging could not be set up.
pub fn init_logging_or_warn(dir: &Path, default_level: &str) -> bool {
    match init_logging(dir, default_level) {
        Ok(()) => true,
        Err(e) => {
            eprintln!(
                "warning: cannot log to {}: {e}; continuing without file logging",
                dir.display()
            );
            false
        }
    }
}
