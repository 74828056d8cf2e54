use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{ModuleError, Result};

const DEFAULT_FILTER: &str = "nios_extattr=info,nios_extensible_attribute=info,warn";
const LOG_FILE_PREFIX: &str = "nios_extattr.log";

/// Initializes logging: a console layer on stderr (stdout carries the
/// module result) and, when a directory is configured, a daily JSON file.
///
/// Keep the returned guard alive until exit so the file writer flushes.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match config.dir.as_deref() {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .map_err(|e| {
                    ModuleError::Config(format!("cannot write logs to '{}': {}", dir, e))
                })?;
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // RUST_LOG wins, then the configured level, then our default
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.level.as_deref().unwrap_or(DEFAULT_FILTER))
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(guard)
}
