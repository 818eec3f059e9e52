//! Tracing setup shared by `mcptool` (HTTP) and `mcptool-mcp` (stdio).
//!
//! `mcptool-mcp` speaks JSON-RPC on stdout, so console logs always go to stderr for both
//! binaries. Every tool invocation is also appended to a log file so hosted runs leave a trail:
//! `MCPTOOL_LOG_FILE` when set, otherwise `logs/mcptool.log`.
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable overriding the log file location.
pub const LOG_FILE_ENV: &str = "MCPTOOL_LOG_FILE";

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "mcptool.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the stderr and file subscribers, filtered by `RUST_LOG` (default `info`).
///
/// Later calls keep the first subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let file_layer = log_file_writer(&log_file_path()).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Log file chosen from `MCPTOOL_LOG_FILE`, falling back to `logs/mcptool.log`.
pub fn log_file_path() -> PathBuf {
    resolve_log_file(std::env::var_os(LOG_FILE_ENV).map(PathBuf::from))
}

fn resolve_log_file(configured: Option<PathBuf>) -> PathBuf {
    configured
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
}

/// Open `path` for appending behind a non-blocking writer; `None` disables file logging.
fn log_file_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(err) = fs::create_dir_all(dir) {
            eprintln!("Failed to create log directory {}: {err}", dir.display());
            return None;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_defaults_under_logs_dir() {
        assert_eq!(resolve_log_file(None), PathBuf::from("logs/mcptool.log"));
        assert_eq!(
            resolve_log_file(Some(PathBuf::new())),
            PathBuf::from("logs/mcptool.log")
        );
        assert_eq!(
            resolve_log_file(Some(PathBuf::from("/var/log/mcptool/run.log"))),
            PathBuf::from("/var/log/mcptool/run.log")
        );
    }

    #[test]
    fn writer_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("tool.log");
        assert!(log_file_writer(&path).is_some());
        assert!(path.exists());
    }
}
