//! A scripted [`SyncSource`] for exercising the refresh scheduler
//!
//! Counts every call, can be told to fail, and can hold `synchronize` open
//! until the test releases it, which makes overlapping refreshes
//! deterministic.

use crate::core::CatalogError;
use crate::source::SyncSource;
use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

/// Sync source double with call counters.
#[derive(Debug)]
pub struct ScriptedSyncSource {
    ensure_calls: AtomicUsize,
    sync_calls: AtomicUsize,
    fail_ensure: AtomicBool,
    fail_sync: AtomicBool,
    hold: AtomicBool,
    present: AtomicBool,
    release: Semaphore,
    started: Notify,
}

impl Default for ScriptedSyncSource {
    fn default() -> Self {
        Self {
            ensure_calls: AtomicUsize::new(0),
            sync_calls: AtomicUsize::new(0),
            fail_ensure: AtomicBool::new(false),
            fail_sync: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            present: AtomicBool::new(true),
            release: Semaphore::new(0),
            started: Notify::new(),
        }
    }
}

impl ScriptedSyncSource {
    /// A source whose operations succeed immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `synchronize` blocks until [`release`](Self::release).
    pub fn held() -> Self {
        let source = Self::default();
        source.hold.store(true, Ordering::SeqCst);
        source
    }

    /// A source that treats any existing directory as not yet cloned, until
    /// `ensure_present` succeeds.
    pub fn without_mirror() -> Self {
        let source = Self::default();
        source.present.store(false, Ordering::SeqCst);
        source
    }

    /// Makes subsequent `ensure_present` calls fail.
    pub fn fail_ensure(&self, fail: bool) {
        self.fail_ensure.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `synchronize` calls fail.
    pub fn fail_sync(&self, fail: bool) {
        self.fail_sync.store(fail, Ordering::SeqCst);
    }

    /// Lets one held `synchronize` call complete.
    pub fn release(&self) {
        self.release.add_permits(1);
    }

    /// Waits until a `synchronize` call has started.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn sync_calls(&self) -> usize {
        self.sync_calls.load(Ordering::SeqCst)
    }
}

impl SyncSource for ScriptedSyncSource {
    fn is_present(&self, local_path: &Path) -> bool {
        self.present.load(Ordering::SeqCst) && local_path.is_dir()
    }

    async fn ensure_present(&self, remote: &str, local_path: &Path) -> Result<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_ensure.load(Ordering::SeqCst) {
            return Err(CatalogError::GitCloneFailed {
                url: remote.to_string(),
                reason: "scripted failure".to_string(),
            }
            .into());
        }
        tokio::fs::create_dir_all(local_path).await?;
        self.present.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn synchronize(&self, _local_path: &Path) -> Result<()> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        if self.hold.load(Ordering::SeqCst) {
            self.release.acquire().await?.forget();
        }
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(CatalogError::GitCommandError {
                operation: "pull".to_string(),
                stderr: "scripted failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
