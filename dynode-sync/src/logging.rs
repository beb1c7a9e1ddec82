//! Logging setup for the dynode sync controller.
//!
//! Console output, an optional file sink, and archiving of the previous run's
//! log so that a restarted node keeps a short history of sync sessions.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{LoggingError, LoggingResult};

/// Prefix for archived log files.
const ARCHIVE_PREFIX: &str = "dynode-sync.";
/// Name of the log file written by the current process.
const ACTIVE_LOG_NAME: &str = "run.log";

/// Keeps the non-blocking file writer alive. Dropping it flushes buffered lines.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter. If None, `RUST_LOG` is consulted, then INFO.
    pub level: Option<LevelFilter>,
    /// Whether to write to stderr.
    pub console: bool,
    /// Optional file output.
    pub file: Option<LogFileConfig>,
}

/// Configuration for log file output.
#[derive(Debug, Clone)]
pub struct LogFileConfig {
    /// Directory holding `run.log` and the archives.
    pub log_dir: PathBuf,
    /// Maximum number of archived logs to keep.
    pub max_files: usize,
}

/// Initialize console-only logging with the given level.
pub fn init_console_logging(level: LevelFilter) -> LoggingResult<LoggingGuard> {
    init_logging(LoggingConfig {
        level: Some(level),
        console: true,
        file: None,
    })
}

/// Initialize logging with the given configuration.
///
/// The returned guard must outlive every log call that should reach the file.
/// With neither console nor file enabled this is a no-op that still succeeds.
///
/// # Errors
///
/// Fails if the log directory cannot be prepared or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingGuard> {
    if !config.console && config.file.is_none() {
        return Ok(LoggingGuard {
            _worker_guard: None,
        });
    }

    let env_filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string())),
    };

    let (file_layer, guard) = match config.file {
        Some(ref file_config) => {
            let (writer, guard) = open_log_file(file_config)?;
            let layer = fmt::layer().with_target(true).with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = config.console.then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))?;

    Ok(LoggingGuard {
        _worker_guard: guard,
    })
}

/// Prepare the log directory, archive the last run and open a fresh `run.log`.
fn open_log_file(config: &LogFileConfig) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.log_dir)?;
    archive_previous_log(&config.log_dir)?;
    prune_archives(&config.log_dir, config.max_files)?;

    let file = File::create(config.log_dir.join(ACTIVE_LOG_NAME))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Rename an existing `run.log` to `dynode-sync.YYYY-MM-DD.HHMMSS.log`,
/// stamped with the file's modification time.
fn archive_previous_log(log_dir: &Path) -> LoggingResult<()> {
    let active = log_dir.join(ACTIVE_LOG_NAME);
    if !active.exists() {
        return Ok(());
    }

    let stamp = modified_at(&active).unwrap_or_else(Local::now).format("%Y-%m-%d.%H%M%S");
    let mut target = log_dir.join(format!("{}{}.log", ARCHIVE_PREFIX, stamp));
    if target.exists() {
        target = (1..=999)
            .map(|n| log_dir.join(format!("{}{}-{}.log", ARCHIVE_PREFIX, stamp, n)))
            .find(|candidate| !candidate.exists())
            .ok_or_else(|| {
                LoggingError::RotationFailed("too many archives share one timestamp".to_string())
            })?;
    }

    fs::rename(&active, &target).map_err(|e| LoggingError::RotationFailed(e.to_string()))
}

fn modified_at(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::from(modified))
}

fn is_archive(name: &str) -> bool {
    name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log")
}

/// Delete the oldest archives until at most `max_files` remain. `run.log` is never touched.
fn prune_archives(log_dir: &Path, max_files: usize) -> LoggingResult<()> {
    let mut archives: Vec<_> = fs::read_dir(log_dir)
        .map_err(|e| LoggingError::RotationFailed(format!("failed to read log dir: {}", e)))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_archive))
        .collect();

    if archives.len() <= max_files {
        return Ok(());
    }

    archives.sort_by_key(|entry| entry.metadata().and_then(|m| m.modified()).ok());

    let excess = archives.len() - max_files;
    for entry in archives.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(entry.path()) {
            tracing::warn!("Failed to remove old log file {:?}: {}", entry.path(), e);
        }
    }

    Ok(())
}
