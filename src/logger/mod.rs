//! Logger module
//!
//! Provides logging utilities for the server:
//! - `tracing` subscriber setup (level filter, optional log file)
//! - Server lifecycle logging
//! - Access logging with multiple formats under the `access` target

mod format;

pub use format::AccessLogEntry;

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{AppState, LoggingConfig};
use crate::error::StartupError;

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG`, when set,
/// overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| StartupError::Logger(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.log_file.as_deref() {
        Some(path) => {
            let file = open_log_file(path).map_err(|e| StartupError::Logger(e.to_string()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    result.map_err(|e| StartupError::Logger(e.to_string()))
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> std::io::Result<std::fs::File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    tracing::info!(
        %addr,
        root = %state.site.path().display(),
        hosted = state.hosted,
        workers = ?state.config.server.workers,
        "cheatsheet server listening on http://{addr}"
    );
    if state.hosted {
        tracing::info!(
            env_var = %state.config.hosted.env_var,
            "hosted mode: plain HTTP requests are redirected to HTTPS"
        );
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
