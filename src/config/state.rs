// Application state module
// Immutable runtime state built once at startup and shared by every connection

use std::path::{Path, PathBuf};

use super::types::Config;
use crate::error::StartupError;
use crate::http::security::SecurityHeaders;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub site: SiteRoot,
    pub security: SecurityHeaders,
    /// Plain-HTTP requests are redirected to HTTPS when set
    pub hosted: bool,
    pub access_log: bool,
}

/// Canonical document root plus the well-known documents inside it
#[derive(Debug, Clone)]
pub struct SiteRoot {
    root: PathBuf,
    pub index_file: String,
    pub not_found_page: String,
    pub cache_control: String,
}

impl SiteRoot {
    /// Validate the document root; a missing or non-directory root is fatal
    pub fn open(
        root: &Path,
        index_file: &str,
        not_found_page: &str,
        max_age: Option<u64>,
    ) -> Result<Self, StartupError> {
        let canonical = root
            .canonicalize()
            .map_err(|source| StartupError::DocumentRoot {
                path: root.to_path_buf(),
                source,
            })?;

        // read_dir proves the directory is listable, not just present
        std::fs::read_dir(&canonical).map_err(|source| StartupError::DocumentRoot {
            path: root.to_path_buf(),
            source,
        })?;

        let cache_control = match max_age {
            Some(secs) => format!("public, max-age={secs}"),
            None => "no-cache".to_string(),
        };

        Ok(Self {
            root: canonical,
            index_file: index_file.to_string(),
            not_found_page: not_found_page.to_string(),
            cache_control,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl AppState {
    /// Build state from configuration with an explicit hosted flag
    pub fn new(config: Config, hosted: bool) -> Result<Self, StartupError> {
        let site = SiteRoot::open(
            &config.site.root,
            &config.site.index_file,
            &config.site.not_found_page,
            config.site.max_age,
        )?;
        let hsts = hosted.then_some(&config.hosted);
        let security = SecurityHeaders::from_config(&config.security, hsts)?;
        let access_log = config.logging.access_log;

        Ok(Self {
            config,
            site,
            security,
            hosted,
            access_log,
        })
    }

    /// Build state, deciding hosted mode from the environment
    pub fn from_env(config: Config) -> Result<Self, StartupError> {
        let hosted = config.detect_hosted();
        Self::new(config, hosted)
    }
}
