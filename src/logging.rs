//! Tracing setup for the command-line binary.

use std::fs;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Name of the append-only log file.
pub const LOG_FILE: &str = "registry.log";

/// Install the global subscriber.
///
/// Stderr shows warnings by default; each `-v` raises it one level. The log
/// file records `info` and above unless `RUST_LOG` says otherwise. If the
/// file cannot be opened, logging continues on stderr only.
///
/// The returned guard must be held until exit so buffered lines are flushed.
pub fn init(log_dir: &Path, verbose: u8) -> Option<WorkerGuard> {
    let default_directive = match verbose {
        0 | 1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_filter(stderr_level(verbose));

    match file_writer(log_dir) {
        Ok((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        Err(e) => {
            eprintln!("hivescope: file logging disabled: {e}");
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

fn stderr_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn file_writer(
    log_dir: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), String> {
    fs::create_dir_all(log_dir)
        .map_err(|e| format!("create log directory failed: {} ({e})", log_dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(log_dir)
        .map_err(|e| format!("open {} failed: {e}", log_dir.join(LOG_FILE).display()))?;

    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_levels() {
        assert_eq!(stderr_level(0), LevelFilter::WARN);
        assert_eq!(stderr_level(1), LevelFilter::INFO);
        assert_eq!(stderr_level(7), LevelFilter::TRACE);
    }

    #[test]
    fn test_file_writer_creates_log() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        let (_writer, guard) = file_writer(&log_dir).unwrap();
        drop(guard);
        assert!(log_dir.join(LOG_FILE).is_file());
    }
}
