//! Logging and tracing setup for the CLI
//!
//! Diagnostics go to stderr through `tracing-subscriber`, filtered by
//! `RUST_LOG` (default `warn`), so stdout carries only the run's report.
//! With a log directory configured, a daily-rotated JSON log is written
//! there as well.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Cli;

/// File name prefix of the JSON log
const LOG_FILE_NAME: &str = "sqlrun.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for JSON log files, if any
    pub log_dir: Option<PathBuf>,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            include_location: cfg!(debug_assertions),
            default_filter: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            log_dir: cli.log_dir.clone(),
            ..Self::default()
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the JSON log when dropped and must be kept
/// alive until the program exits.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    // RUST_LOG takes precedence over the default filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let mut layers = Vec::new();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone())
        .boxed();
    layers.push(console_layer);

    let mut guard = None;
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = config.log_dir.as_ref().map(|dir| dir.display().to_string()),
        "logging initialized"
    );

    Ok(guard)
}
