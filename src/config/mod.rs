// Configuration module entry point
// Loads layered configuration and resolves it into the immutable runtime state

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};

use crate::error::StartupError;

// Re-export public types
pub use state::{AppState, SiteRoot};
pub use types::{
    Config, CspDirective, FeaturePolicyEntry, HostedConfig, LoggingConfig, PerformanceConfig,
    SecurityConfig, ServerConfig, SiteConfig,
};

/// Prefix for environment overrides, e.g. `CHEATSHEET__SITE__ROOT`
const ENV_PREFIX: &str = "CHEATSHEET";

/// Port variable injected by hosting platforms
const PORT_VAR: &str = "PORT";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Layers: defaults, then the file, then `CHEATSHEET__*`, then `PORT`
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("site.root", "docs/_build/html")?
            .set_default("site.index_file", "index.html")?
            .set_default("site.not_found_page", "404.html")?
            .set_default("hosted.env_var", "DYNO")?
            .set_default("hosted.hsts_max_age", 31_536_000)?
            .set_default("hosted.hsts_include_subdomains", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("performance.shutdown_timeout", 10)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        if let Ok(port) = std::env::var(PORT_VAR) {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| StartupError::InvalidAddress(self.server.host.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Hosted mode is decided once, from the presence of the configured variable
    pub fn detect_hosted(&self) -> bool {
        std::env::var_os(&self.hosted.env_var).is_some()
    }
}
