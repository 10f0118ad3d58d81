//! Tracing subscriber setup
//!
//! Events always go to stdout. With a log directory configured, warnings and errors are
//! additionally written to `<dir>/<YYYY-MM-DD-HH>.error.log` and info events to
//! `<dir>/<YYYY-MM-DD-HH>.info.log`. Both files roll over hourly and only the newest
//! `MAX_LOG_FILES` of each are kept.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Current file plus three rotated ones, per sink
const MAX_LOG_FILES: usize = 4;
const ERROR_LOG_SUFFIX: &str = "error.log";
const INFO_LOG_SUFFIX: &str = "info.log";

/// Keeps the file writers alive. Dropping it flushes pending events.
#[must_use]
#[derive(Default)]
pub struct LogGuard {
    _workers: Vec<WorkerGuard>,
}

/// Install the global subscriber
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> Result<LogGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let mut layers: Vec<BoxedLayer> =
        vec![fmt::layer().with_target(false).with_filter(filter).boxed()];

    let mut guard = LogGuard::default();
    if let Some(dir) = log_dir {
        let (file_layers, file_guard) = file_layers(dir)?;
        layers.extend(file_layers);
        guard = file_guard;
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("failed to install log subscriber")?;

    Ok(guard)
}

fn file_layers(dir: &Path) -> Result<(Vec<BoxedLayer>, LogGuard)> {
    let (error_writer, error_guard) = rolling_writer(dir, ERROR_LOG_SUFFIX)?;
    let (info_writer, info_guard) = rolling_writer(dir, INFO_LOG_SUFFIX)?;

    let layers = vec![
        fmt::layer()
            .with_ansi(false)
            .with_writer(error_writer)
            .with_filter(LevelFilter::WARN)
            .boxed(),
        fmt::layer()
            .with_ansi(false)
            .with_writer(info_writer)
            .with_filter(filter_fn(|metadata| *metadata.level() == Level::INFO))
            .boxed(),
    ];

    Ok((
        layers,
        LogGuard {
            _workers: vec![error_guard, info_guard],
        },
    ))
}

fn rolling_writer(dir: &Path, suffix: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_suffix(suffix)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("failed to open {suffix} in {}", dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}
