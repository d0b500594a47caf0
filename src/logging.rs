//! File logging.
//
// The terminal belongs to the UI, so events only ever go to
// `<cache>/linkwise/logs/linkwise.log`. `LINKWISE_LOG` overrides the
// configured level with any `EnvFilter` directive.
//
// Keep the returned guard alive until the program exits or buffered
// lines are lost.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub const LOG_ENV: &str = "LINKWISE_LOG";
const LOG_FILE: &str = "linkwise.log";

#[allow(dead_code)]
pub struct LogGuard(tracing_appender::non_blocking::WorkerGuard);

pub fn log_path() -> PathBuf {
    Config::log_dir().join(LOG_FILE)
}

/// Installs the global subscriber. Returns `None` when the log file cannot
/// be opened; the app then runs without logging.
pub fn init(level: &str) -> Option<LogGuard> {
    let dir = Config::log_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("linkwise: cannot create log directory {}: {e}", dir.display());
        return None;
    }
    let file = open_log(&dir.join(LOG_FILE))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter(level))
        .with(file_layer)
        .try_init()
        .ok()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    Some(LogGuard(guard))
}

fn open_log(path: &Path) -> Option<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eprintln!("linkwise: cannot open {}: {e}", path.display()))
        .ok()
}

/// `LINKWISE_LOG` when set, the configured level otherwise, `info` as a last resort.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_in_log_dir() {
        assert!(log_path().starts_with(Config::log_dir()));
        assert!(log_path().ends_with(LOG_FILE));
    }

    #[test]
    fn bad_level_falls_back() {
        // must not panic on nonsense
        let _ = filter("not a [valid level");
        let _ = filter("debug");
    }
}
