//! Refresh scheduling for the catalog index
//!
//! A refresh is one synchronize-then-rebuild cycle: bring the local mirror up
//! to date through the [`SyncSource`], then rebuild the [`CatalogIndex`] from
//! whatever tree is on disk afterwards.
//!
//! [`RefreshScheduler`] admits at most one refresh at a time through a single
//! permit gate. Admission is a non-blocking attempt: a refresh requested while
//! another one runs is dropped with a log line, not queued. Ticks of the
//! background poll that land on a running refresh are dropped the same way.
//!
//! Sync failures during a refresh are logged and the rebuild still runs, so a
//! catalog that cannot reach its remote keeps serving the last pulled tree.
//! A refresh that finds no usable mirror clones it again. Only
//! [`bootstrap`](RefreshScheduler::bootstrap) treats a failure to create the
//! mirror as fatal.

use crate::catalog::{CatalogIndex, RebuildReport};
use crate::source::SyncSource;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// What happened to a refresh request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The request was admitted and published a new snapshot
    Completed(RebuildReport),
    /// Another refresh was already running
    Skipped,
}

/// Drives synchronize-then-rebuild cycles against one mirror.
#[derive(Debug)]
pub struct RefreshScheduler<S> {
    source: S,
    index: Arc<CatalogIndex>,
    gate: Semaphore,
    remote: String,
    local_path: PathBuf,
}

impl<S: SyncSource> RefreshScheduler<S> {
    /// Creates a scheduler that mirrors `remote` into `local_path` and
    /// rebuilds `index` after every sync.
    pub fn new(
        source: S,
        index: Arc<CatalogIndex>,
        remote: impl Into<String>,
        local_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            index,
            gate: Semaphore::new(1),
            remote: remote.into(),
            local_path: local_path.into(),
        }
    }

    /// The index this scheduler publishes into.
    #[must_use]
    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    /// Location of the local mirror.
    #[must_use]
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// First run: clone the mirror unless a usable one is already there,
    /// otherwise pull it, then always build the initial index.
    ///
    /// An existing directory that is not a mirror (an empty volume, or what
    /// an interrupted clone left behind) is cloned into like a missing one.
    ///
    /// # Errors
    ///
    /// Fails if no usable mirror exists and one cannot be created. A failed
    /// pull of an existing mirror is only logged.
    pub async fn bootstrap(&self) -> Result<RebuildReport> {
        let _permit = self.gate.acquire().await?;

        if self.source.is_present(&self.local_path) {
            tracing::info!(
                target: "refresh",
                "Catalog mirror found at {}",
                self.local_path.display()
            );
            self.synchronize_logged().await;
        } else {
            tracing::info!(
                target: "refresh",
                "No catalog mirror at {}, cloning {}",
                self.local_path.display(),
                self.remote
            );
            self.source.ensure_present(&self.remote, &self.local_path).await?;
        }

        self.rebuild().await
    }

    /// Runs one refresh cycle unless another one is in flight.
    ///
    /// # Errors
    ///
    /// Only fails if the rebuild task itself could not be joined; sync
    /// failures are logged and the rebuild proceeds.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let Ok(_permit) = self.gate.try_acquire() else {
            tracing::info!(target: "refresh", "Refresh catalog is already in process, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        tracing::debug!(target: "refresh", "Refreshing catalog");
        if self.source.is_present(&self.local_path) {
            self.synchronize_logged().await;
        } else if let Err(e) = self.source.ensure_present(&self.remote, &self.local_path).await {
            tracing::error!(
                target: "refresh",
                "Catalog mirror at {} is gone and could not be cloned again: {:#}",
                self.local_path.display(),
                e
            );
        }
        let report = self.rebuild().await?;
        Ok(RefreshOutcome::Completed(report))
    }

    /// Requests a refresh in the background and returns immediately.
    pub fn trigger_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = scheduler.refresh().await {
                tracing::error!(target: "refresh", "Triggered refresh failed: {:#}", e);
            }
        })
    }

    /// Starts the periodic refresh task.
    ///
    /// The first tick fires one `every` after the call; the initial catalog
    /// comes from [`bootstrap`](Self::bootstrap). The task runs until the
    /// returned handle is aborted or the runtime shuts down.
    pub fn start_background_poll(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match self.refresh().await {
                    Ok(RefreshOutcome::Completed(report)) => {
                        tracing::debug!(
                            target: "refresh",
                            "Periodic refresh published generation {}",
                            report.generation
                        );
                    }
                    Ok(RefreshOutcome::Skipped) => {}
                    Err(e) => {
                        tracing::error!(target: "refresh", "Periodic refresh failed: {:#}", e);
                    }
                }
            }
        })
    }

    async fn synchronize_logged(&self) {
        if let Err(e) = self.source.synchronize(&self.local_path).await {
            tracing::error!(
                target: "refresh",
                "Failed to sync the catalog, serving the existing tree: {:#}",
                e
            );
        }
    }

    async fn rebuild(&self) -> Result<RebuildReport> {
        let index = Arc::clone(&self.index);
        tokio::task::spawn_blocking(move || index.rebuild())
            .await
            .map_err(|e| anyhow!("Task join error during catalog rebuild: {}", e))
    }
}
