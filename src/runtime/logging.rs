//! File logging. The terminal belongs to the UI, so nothing is written to stderr.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{self, LogSettings};

/// Where log lines go: the configured file or the XDG state default.
pub fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(config::default_log_path)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// Returns the log file in use, or `None` when logging stays disabled because
/// the file could not be opened.
pub fn init(settings: &LogSettings) -> Option<PathBuf> {
    let path = log_path(settings)?;
    let file = open_log_file(&path).ok()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Some(path)
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
