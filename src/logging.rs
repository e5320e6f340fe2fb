//! File-based logging for the listener
//!
//! The console driver owns stdin/stdout, so tracing output goes to a rolling
//! log file instead of the terminal.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "listener-rs";
const LOG_FILE_SUFFIX: &str = "log";
const DEFAULT_FILTER: &str = "listener_rs=debug,reqwest=info,warn";

/// Start writing session logs under `log_dir`.
///
/// One file per day, `listener-rs.YYYY-MM-DD.log`. Lines carry the time since
/// start-up rather than wall-clock time, which lines up with track positions.
/// `RUST_LOG` overrides the default filter.
///
/// Buffered lines are flushed when the returned guard drops, so keep it alive
/// until the session is shut down.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(fmt::time::Uptime::default())
        .with_level(true)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = %log_dir.display(), "Logging initialized");
    Ok(guard)
}

/// Log the outcome of an engine transport call
#[macro_export]
macro_rules! log_engine_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "Engine call succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Engine call failed"),
        }
    };
}
