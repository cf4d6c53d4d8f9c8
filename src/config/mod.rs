//! Service configuration
//!
//! [`CatalogConfig`] is assembled from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file passed with `--config`
//! 3. Command-line flags (or their `CATALOG_*` environment variables),
//!    collected in [`ConfigOverrides`]
//!
//! # File Format
//!
//! ```toml
//! catalog_url = "https://github.com/example/catalog.git"
//! refresh_interval = 120      # seconds between background pulls
//! data_dir = "/var/lib/catalog"
//! templates_dir = "templates"
//! branch = "master"           # omit to pull the tracking branch
//! git_timeout = 300           # seconds allowed for one clone or pull
//! log_file = "/var/log/catalog-service.log"
//! debug = false
//! ```
//!
//! Every key is optional in the file, but `catalog_url` must be set by one of
//! the layers; [`CatalogConfig::validate`] rejects a configuration without it.

use crate::core::CatalogError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default seconds between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: u64 = 60;
/// Default seconds allowed for a single clone or pull.
pub const DEFAULT_GIT_TIMEOUT: u64 = 300;
/// Default location of the local mirror.
pub const DEFAULT_DATA_DIR: &str = "./DATA";
/// Default subdirectory of the mirror holding the templates.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Resolved configuration of the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Remote catalog repository to mirror
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_url: Option<String>,
    /// Seconds between background refreshes
    pub refresh_interval: u64,
    /// Local mirror directory; safe to delete, it is re-cloned on start
    pub data_dir: PathBuf,
    /// Template root, relative to `data_dir`
    pub templates_dir: PathBuf,
    /// Branch to pull; the tracking branch when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Seconds allowed for one clone or pull
    pub git_timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_url: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            branch: None,
            git_timeout: DEFAULT_GIT_TIMEOUT,
            log_file: None,
            debug: false,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub catalog_url: Option<String>,
    pub refresh_interval: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub branch: Option<String>,
    pub git_timeout: Option<u64>,
    pub log_file: Option<PathBuf>,
    /// Only ever turns debug output on
    pub debug: bool,
}

impl CatalogConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this structure.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Loads from `path` when given, otherwise starts from the defaults.
    ///
    /// An explicitly given file must exist.
    pub async fn load_with_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Applies command-line values on top of this configuration.
    #[must_use]
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.catalog_url.is_some() {
            self.catalog_url = overrides.catalog_url;
        }
        if let Some(interval) = overrides.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(templates_dir) = overrides.templates_dir {
            self.templates_dir = templates_dir;
        }
        if overrides.branch.is_some() {
            self.branch = overrides.branch;
        }
        if let Some(timeout) = overrides.git_timeout {
            self.git_timeout = timeout;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        self.debug |= overrides.debug;
        self
    }

    /// Checks the values a running service cannot do without.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ConfigError`] when the catalog URL is missing or
    /// empty, or when an interval or timeout is zero.
    pub fn validate(&self) -> Result<()> {
        self.catalog_url()?;
        if self.refresh_interval == 0 {
            return Err(CatalogError::ConfigError {
                message: "refresh_interval must be at least 1 second".to_string(),
            }
            .into());
        }
        if self.git_timeout == 0 {
            return Err(CatalogError::ConfigError {
                message: "git_timeout must be at least 1 second".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// The remote catalog repository.
    pub fn catalog_url(&self) -> Result<&str, CatalogError> {
        match self.catalog_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(CatalogError::ConfigError {
                message: "catalog_url is required (set --catalog-url or CATALOG_URL)"
                    .to_string(),
            }),
        }
    }

    /// Directory the index reads templates from.
    #[must_use]
    pub fn template_root(&self) -> PathBuf {
        self.data_dir.join(&self.templates_dir)
    }

    #[must_use]
    pub const fn refresh_every(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    #[must_use]
    pub const fn git_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.git_timeout)
    }
}
