use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Environment variable holding a filter directive, e.g. `feed_tui=debug`.
pub const LOG_ENV: &str = "FEED_TUI_LOG";

/// Installs the global subscriber. The terminal belongs to the UI, so events
/// only ever go to the log file; without one logging stays off.
pub fn init(cfg: &LoggingConfig) -> Result<bool> {
    let Some(path) = cfg.file.as_deref() else {
        return Ok(false);
    };
    let file = open_log_file(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(version = crate::VERSION, path = %path.display(), "logging started");
    }
    Ok(installed)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn no_file_means_no_logging() {
        let cfg = LoggingConfig {
            file: None,
            level: "debug".into(),
        };
        assert!(!init(&cfg).unwrap());
    }

    #[test]
    fn log_file_is_created_with_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("feed-tui.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
