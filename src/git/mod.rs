//! Git operations wrapper for the catalog mirror
//!
//! The catalog repository is kept as a plain working copy on local disk and
//! maintained with the system `git` command rather than an embedded Git
//! library, so the service works with whatever authentication (SSH agent,
//! credential helpers, tokens embedded in the URL) the host already has.
//!
//! Only the operations the mirror needs are exposed:
//! - [`GitRepo::clone_with_timeout`] creates the mirror on first start
//! - [`GitRepo::pull`] brings an existing mirror up to date
//! - [`GitRepo::current_commit`] reports the revision being served
//!
//! All operations are async and run through [`GitCommand`], which applies a
//! timeout and maps failures to [`CatalogError`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_service::git::GitRepo;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let url = "https://github.com/example/catalog.git";
//! let repo = GitRepo::clone_with_timeout(url, "./DATA", Duration::from_secs(300)).await?;
//! repo.pull(Some("master")).await?;
//! println!("serving {}", repo.current_commit().await?);
//! # Ok(())
//! # }
//! ```
//!
//! [`CatalogError`]: crate::core::CatalogError

pub mod command_builder;

use crate::core::CatalogError;
use crate::git::command_builder::{DEFAULT_GIT_TIMEOUT, GitCommand, git_command};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A handle to a local Git working copy.
///
/// The struct holds only the path and a timeout; repository state is always
/// queried from git directly.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// The local filesystem path to the repository root
    path: PathBuf,
    /// Timeout applied to network operations
    timeout: Duration,
}

impl GitRepo {
    /// Creates a handle for an existing local repository.
    ///
    /// This does not verify that `path` is a repository; see
    /// [`is_git_repo`](Self::is_git_repo).
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    /// Sets the timeout used by [`pull`](Self::pull).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clones `url` into `target`, giving up after `timeout`.
    ///
    /// `target` may be missing or an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GitCloneFailed`] if git rejects the clone
    /// (unreachable URL, authentication, non-empty target directory).
    pub async fn clone_with_timeout(
        url: &str,
        target: impl AsRef<Path>,
        timeout: Duration,
    ) -> Result<Self> {
        let target_path = target.as_ref();

        GitCommand::clone(url, target_path)
            .timeout(Some(timeout))
            .with_context("Cloning catalog")
            .execute_success()
            .await?;

        Ok(Self::new(target_path).with_timeout(timeout))
    }

    /// Pulls the latest changes into the working copy.
    ///
    /// With `branch`, pulls `origin <branch>`; otherwise the branch the
    /// working copy tracks. Only fast-forwards are accepted, since the
    /// mirror is never modified locally.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::GitCommandError`] if the pull fails or times out.
    pub async fn pull(&self, branch: Option<&str>) -> Result<()> {
        GitCommand::pull(branch)
            .current_dir(&self.path)
            .timeout(Some(self.timeout))
            .with_context("Pulling catalog")
            .execute_success()
            .await
    }

    /// Returns the commit hash currently checked out.
    pub async fn current_commit(&self) -> Result<String> {
        GitCommand::current_commit().current_dir(&self.path).execute_stdout().await
    }

    /// Checks whether the path contains a working copy (a `.git` entry).
    #[must_use]
    pub fn is_git_repo(&self) -> bool {
        is_valid_git_repo(&self.path)
    }
}

/// Checks if the git executable can be found on `PATH`.
#[must_use]
pub fn is_git_installed() -> bool {
    which::which(git_command()).is_ok()
}

/// Ensures Git is available on the system.
///
/// # Errors
///
/// Returns [`CatalogError::GitNotFound`] if git is not on `PATH`.
pub fn ensure_git_available() -> Result<()> {
    if !is_git_installed() {
        return Err(CatalogError::GitNotFound.into());
    }
    Ok(())
}

/// Checks if `path` is the root of a git working copy.
///
/// `.git` may be a directory or, for worktrees and submodules, a file.
#[must_use]
pub fn is_valid_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}
