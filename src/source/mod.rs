//! The sync source that keeps the local catalog mirror up to date.
//!
//! The refresh scheduler only needs three things from wherever the catalog
//! comes from: tell whether a usable local copy exists, create one, and bring
//! an existing copy up to date. [`SyncSource`] captures exactly that, so the scheduler can be
//! driven by [`GitSyncSource`] in production and by a scripted source in
//! tests.
//!
//! # Failure semantics
//!
//! Failing to create the mirror on first start is fatal to bootstrap, since
//! there is nothing to serve. Failing to synchronize an existing mirror is
//! logged by the caller and the stale tree keeps being served.

use crate::git::{GitRepo, is_valid_git_repo};
use anyhow::Result;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Provides a local directory tree mirroring a remote catalog repository.
pub trait SyncSource: Send + Sync + 'static {
    /// Whether `local_path` holds a usable mirror.
    ///
    /// A directory that merely exists (empty, or left behind by an
    /// interrupted clone) is not a mirror.
    fn is_present(&self, local_path: &Path) -> bool;

    /// Creates the local mirror at `local_path` from `remote`, if missing.
    fn ensure_present(
        &self,
        remote: &str,
        local_path: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Updates the existing mirror at `local_path` to the latest remote state.
    fn synchronize(&self, local_path: &Path) -> impl Future<Output = Result<()>> + Send;
}

impl<T: SyncSource> SyncSource for Arc<T> {
    fn is_present(&self, local_path: &Path) -> bool {
        (**self).is_present(local_path)
    }

    fn ensure_present(
        &self,
        remote: &str,
        local_path: &Path,
    ) -> impl Future<Output = Result<()>> + Send {
        (**self).ensure_present(remote, local_path)
    }

    fn synchronize(&self, local_path: &Path) -> impl Future<Output = Result<()>> + Send {
        (**self).synchronize(local_path)
    }
}

/// [`SyncSource`] backed by the system `git` command.
#[derive(Debug, Clone)]
pub struct GitSyncSource {
    /// Branch to pull; `None` pulls the branch the mirror tracks
    branch: Option<String>,
    /// Timeout for clone and pull
    timeout: Duration,
}

impl GitSyncSource {
    /// Creates a git source pulling `branch` (or the tracking branch).
    pub const fn new(branch: Option<String>, timeout: Duration) -> Self {
        Self {
            branch,
            timeout,
        }
    }
}

impl SyncSource for GitSyncSource {
    fn is_present(&self, local_path: &Path) -> bool {
        is_valid_git_repo(local_path)
    }

    async fn ensure_present(&self, remote: &str, local_path: &Path) -> Result<()> {
        if self.is_present(local_path) {
            tracing::debug!(target: "git", "Catalog mirror already present at {}", local_path.display());
            return Ok(());
        }
        tracing::info!(target: "git", "Cloning the catalog from {}", remote);
        GitRepo::clone_with_timeout(remote, local_path, self.timeout).await?;
        Ok(())
    }

    async fn synchronize(&self, local_path: &Path) -> Result<()> {
        tracing::info!(target: "git", "Pulling the catalog to sync any new changes");
        GitRepo::new(local_path).with_timeout(self.timeout).pull(self.branch.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestGit;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_git_source_clone_and_synchronize() {
        let temp = TempDir::new().unwrap();
        let upstream = temp.path().join("upstream");
        std::fs::create_dir_all(upstream.join("templates/foo")).unwrap();
        std::fs::write(upstream.join("templates/foo/config.yml"), "name: Foo\n").unwrap();
        let git = TestGit::new(&upstream);
        git.init().unwrap();
        git.config_user().unwrap();
        git.add_all().unwrap();
        git.commit("initial").unwrap();

        let source = GitSyncSource::new(None, Duration::from_secs(60));
        let local = temp.path().join("DATA");
        let url = format!("file://{}", upstream.display());

        assert!(!source.is_present(&local));
        source.ensure_present(&url, &local).await.unwrap();
        assert!(source.is_present(&local));
        assert!(local.join("templates/foo/config.yml").exists());

        // Already present: nothing to do
        source.ensure_present(&url, &local).await.unwrap();

        std::fs::write(upstream.join("templates/foo/config.yml"), "name: Foo 2\n").unwrap();
        git.add_all().unwrap();
        git.commit("rename").unwrap();

        source.synchronize(&local).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(local.join("templates/foo/config.yml")).unwrap(),
            "name: Foo 2\n"
        );
    }

    #[tokio::test]
    async fn test_git_source_clones_into_empty_directory() {
        let temp = TempDir::new().unwrap();
        let upstream = temp.path().join("upstream");
        std::fs::create_dir_all(upstream.join("templates/foo")).unwrap();
        std::fs::write(upstream.join("templates/foo/config.yml"), "name: Foo\n").unwrap();
        let git = TestGit::new(&upstream);
        git.init().unwrap();
        git.config_user().unwrap();
        git.add_all().unwrap();
        git.commit("initial").unwrap();

        // A pre-created volume is not a mirror yet
        let local = temp.path().join("DATA");
        std::fs::create_dir_all(&local).unwrap();
        let source = GitSyncSource::new(None, Duration::from_secs(60));
        assert!(!source.is_present(&local));

        source.ensure_present(&format!("file://{}", upstream.display()), &local).await.unwrap();
        assert!(source.is_present(&local));
        assert!(local.join("templates/foo/config.yml").exists());
    }

    #[tokio::test]
    async fn test_git_source_synchronize_without_mirror_fails() {
        let temp = TempDir::new().unwrap();
        let source = GitSyncSource::new(Some("master".to_string()), Duration::from_secs(30));
        assert!(source.synchronize(&temp.path().join("missing")).await.is_err());
    }
}
