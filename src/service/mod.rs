//! The catalog service facade
//!
//! [`CatalogService`] wires a [`SyncSource`], the [`CatalogIndex`] and the
//! [`RefreshScheduler`] together and exposes the operations a transport
//! layer calls:
//!
//! - [`list_templates`](CatalogService::list_templates) never fails and is
//!   empty until the first rebuild
//! - [`get_template_version`](CatalogService::get_template_version) fails
//!   only when the version directory does not exist or the identifiers are
//!   not plain names
//! - [`trigger_refresh`](CatalogService::trigger_refresh) is fire-and-forget
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_service::config::CatalogConfig;
//! use catalog_service::service::CatalogService;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CatalogConfig {
//!     catalog_url: Some("https://github.com/example/catalog.git".to_string()),
//!     ..CatalogConfig::default()
//! };
//! let service = CatalogService::start(&config).await?;
//! let _poll = service.start_background_poll();
//!
//! for template in service.list_templates() {
//!     println!("{}", template.id);
//! }
//! # Ok(())
//! # }
//! ```

use crate::catalog::{CatalogIndex, CatalogSnapshot, RebuildReport};
use crate::config::CatalogConfig;
use crate::git::ensure_git_available;
use crate::refresh::RefreshScheduler;
use crate::source::{GitSyncSource, SyncSource};
use crate::template::{TemplateSummary, TemplateVersion};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Read and refresh operations over one catalog.
#[derive(Debug)]
pub struct CatalogService<S = GitSyncSource> {
    index: Arc<CatalogIndex>,
    scheduler: Arc<RefreshScheduler<S>>,
    refresh_every: Duration,
}

impl CatalogService<GitSyncSource> {
    /// Builds a git-backed service from a configuration without touching
    /// the network or the mirror.
    ///
    /// # Errors
    ///
    /// Returns the validation error if the configuration is incomplete.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        config.validate()?;
        let source = GitSyncSource::new(config.branch.clone(), config.git_timeout_duration());
        Ok(Self::new(
            source,
            config.catalog_url()?,
            config.data_dir.clone(),
            config.template_root(),
            config.refresh_every(),
        ))
    }

    /// Validates the configuration, checks for git, then bootstraps the
    /// mirror and the first catalog.
    ///
    /// # Errors
    ///
    /// Any error here is fatal to startup: invalid configuration, git not
    /// installed, or a failed initial clone.
    pub async fn start(config: &CatalogConfig) -> Result<Self> {
        let service = Self::from_config(config)?;
        ensure_git_available()?;
        let report = service.bootstrap().await?;
        for diagnostic in &report.diagnostics {
            tracing::warn!(target: "catalog", "{}", diagnostic);
        }
        Ok(service)
    }
}

impl<S: SyncSource> CatalogService<S> {
    /// Assembles a service over any sync source.
    pub fn new(
        source: S,
        remote: impl Into<String>,
        local_path: impl Into<PathBuf>,
        template_root: impl Into<PathBuf>,
        refresh_every: Duration,
    ) -> Self {
        let index = Arc::new(CatalogIndex::new(template_root));
        let scheduler =
            Arc::new(RefreshScheduler::new(source, Arc::clone(&index), remote, local_path));
        Self {
            index,
            scheduler,
            refresh_every,
        }
    }

    /// Creates the mirror if needed and publishes the first catalog.
    pub async fn bootstrap(&self) -> Result<RebuildReport> {
        self.scheduler.bootstrap().await
    }

    /// Starts periodic refreshes at the configured interval.
    pub fn start_background_poll(&self) -> JoinHandle<()> {
        Arc::clone(&self.scheduler).start_background_poll(self.refresh_every)
    }

    /// All templates of the current catalog, ordered by id.
    #[must_use]
    pub fn list_templates(&self) -> Vec<TemplateSummary> {
        self.index.list()
    }

    /// Full detail of one template version, with inherited metadata applied.
    ///
    /// # Errors
    ///
    /// Not-found and invalid identifiers surface as
    /// [`CatalogError`](crate::core::CatalogError) variants.
    pub fn get_template_version(&self, template_id: &str, version: &str) -> Result<TemplateVersion> {
        self.index.get_version(template_id, version)
    }

    /// Requests a refresh without waiting for it; dropped if one is running.
    pub fn trigger_refresh(&self) -> JoinHandle<()> {
        self.scheduler.trigger_refresh()
    }

    /// The currently published catalog.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.index.snapshot()
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler<S>> {
        &self.scheduler
    }
}
