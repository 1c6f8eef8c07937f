use std::result::Result;

use snafu::ResultExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{registry, EnvFilter};

use crate::config::Config;
use crate::error::{ApplicationError, InitializeLoggerSnafu, LogFilterSnafu};

const LOG_FILE: &str = "reelsync.log";

/// Pretty console output plus a daily JSON log file under `config.log_dir`.
///
/// `RUST_LOG` wins over `config.log_level` when both are set.
pub fn init(config: &Config) -> Result<WorkerGuard, ApplicationError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).context(LogFilterSnafu {
            directives: config.log_level.clone(),
        })?,
    };

    let (file_layer, guard) = {
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = layer().with_ansi(false).json().with_writer(non_blocking);

        (layer, guard)
    };

    let console_layer = layer().pretty().with_writer(std::io::stdout);

    let subscriber = registry().with(filter).with(console_layer).with(file_layer);
    tracing::subscriber::set_global_default(subscriber).context(InitializeLoggerSnafu)?;

    tracing::debug!(log_dir = %config.log_dir.display(), "logger initialized");
    Ok(guard)
}
