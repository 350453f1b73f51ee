//! Startup error types
//!
//! Per-request failures never leave the gateway; they all collapse into the
//! not-found outcome. Only boot-time failures are represented here.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that prevent the server from accepting connections
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("document root '{}' is not usable: {source}", path.display())]
    DocumentRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("invalid security header value for {header}: {value}")]
    InvalidHeader { header: &'static str, value: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Logger(String),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
