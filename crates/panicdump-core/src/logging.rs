//! Logging configuration using tracing

use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Variable controlling the log filter
pub const LOG_ENV: &str = "PANICDUMP_LOG";

const LOG_FILE_PREFIX: &str = "panicdump.log";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/panicdump/logs/`
/// Log level is controlled by the `PANICDUMP_LOG` environment variable.
///
/// # Examples
/// ```bash
/// PANICDUMP_LOG=debug my-tool < dump.txt
/// PANICDUMP_LOG=panicdump_roots=trace my-tool < dump.txt
/// ```
pub fn init() -> Result<()> {
    init_in(&get_log_directory())
}

/// Initialize logging into `log_dir`, creating it if needed.
///
/// Fails with [`Error::LoggingInit`] when a global subscriber is already set.
pub fn init_in(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    // Default to info, allow override via PANICDUMP_LOG
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("panicdump=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| Error::logging_init(e.to_string()))?;

    tracing::info!("Logging to {}", log_dir.display());

    Ok(())
}

/// Get the log directory path
pub fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("panicdump").join("logs")
}

/// Get the log file path prefix; the appender adds the date suffix
pub fn get_current_log_file() -> PathBuf {
    get_log_directory().join(LOG_FILE_PREFIX)
}
