// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub hosted: HostedConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Document root and the well-known files inside it
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Directory holding the pre-built static site
    pub root: PathBuf,
    /// Document served for `/`
    pub index_file: String,
    /// Page rendered for every not-found outcome
    pub not_found_page: String,
    /// `Cache-Control` max-age for served files; `None` sends `no-cache`
    #[serde(default)]
    pub max_age: Option<u64>,
}

/// Hosted-mode (HTTPS enforcement) configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HostedConfig {
    /// Environment variable whose presence turns hosted mode on
    pub env_var: String,
    pub hsts_max_age: u64,
    pub hsts_include_subdomains: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Log file path (optional, stderr if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on a single connection's lifetime, in seconds
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
    /// How long in-flight connections may run after a shutdown signal
    pub shutdown_timeout: u64,
}

/// Security response header configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    #[serde(default = "default_csp")]
    pub content_security_policy: Vec<CspDirective>,
    #[serde(default = "default_feature_policy")]
    pub feature_policy: Vec<FeaturePolicyEntry>,
}

/// One Content-Security-Policy directive and its allow-list
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CspDirective {
    pub directive: String,
    pub sources: Vec<String>,
}

/// One feature-policy entry, e.g. `geolocation 'none'`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FeaturePolicyEntry {
    pub feature: String,
    pub allow: Vec<String>,
}

impl CspDirective {
    fn new(directive: &str, sources: &[&str]) -> Self {
        Self {
            directive: directive.to_string(),
            sources: sources.iter().map(ToString::to_string).collect(),
        }
    }
}

fn default_csp() -> Vec<CspDirective> {
    vec![
        CspDirective::new("default-src", &["'none'"]),
        CspDirective::new("style-src", &["'self'", "'unsafe-inline'"]),
        CspDirective::new(
            "script-src",
            &[
                "'self'",
                "*.cloudflare.com",
                "*.googletagmanager.com",
                "*.google-analytics.com",
                "'unsafe-inline'",
                "'unsafe-eval'",
            ],
        ),
        CspDirective::new("form-action", &["'self'"]),
        CspDirective::new("base-uri", &["'self'"]),
        CspDirective::new("img-src", &["*"]),
        CspDirective::new("frame-src", &["ghbtns.com"]),
        CspDirective::new("frame-ancestors", &["'none'"]),
        CspDirective::new("object-src", &["'none'"]),
    ]
}

fn default_feature_policy() -> Vec<FeaturePolicyEntry> {
    vec![FeaturePolicyEntry {
        feature: "geolocation".to_string(),
        allow: vec!["'none'".to_string()],
    }]
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            content_security_policy: default_csp(),
            feature_policy: default_feature_policy(),
        }
    }
}
