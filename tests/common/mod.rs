//! Common test utilities for catalog service integration tests
//!
//! [`UpstreamCatalog`] is a real git repository in a temporary directory that
//! plays the remote catalog; tests commit template changes to it and point
//! the service at its `file://` URL.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use catalog_service::test_utils::TestGit;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables the CLI reads; cleared so the host cannot leak in.
const CATALOG_ENV_VARS: &[&str] = &[
    "CATALOG_URL",
    "CATALOG_REFRESH_INTERVAL",
    "CATALOG_DATA_DIR",
    "CATALOG_TEMPLATES_DIR",
    "CATALOG_BRANCH",
    "CATALOG_GIT_TIMEOUT",
    "CATALOG_LOG_FILE",
    "CATALOG_DEBUG",
    "CATALOG_CONFIG",
    "RUST_LOG",
];

/// A git-backed catalog repository plus a scratch area for local mirrors.
pub struct UpstreamCatalog {
    temp: TempDir,
    path: PathBuf,
    pub git: TestGit,
}

impl UpstreamCatalog {
    /// Creates an initialized, empty upstream repository.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let path = temp.path().join("upstream");
        fs::create_dir_all(path.join("templates"))?;
        let git = TestGit::new(&path);
        git.init()?;
        git.config_user()?;
        Ok(Self {
            temp,
            path,
            git,
        })
    }

    /// Writes a file below `templates/`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<&Self> {
        let file = self.path.join("templates").join(relative);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, content).with_context(|| format!("Failed to write {}", file.display()))?;
        Ok(self)
    }

    /// Removes a file or directory below `templates/`.
    pub fn remove(&self, relative: &str) -> Result<&Self> {
        let target = self.path.join("templates").join(relative);
        if target.is_dir() {
            fs::remove_dir_all(&target)?;
        } else {
            fs::remove_file(&target)?;
        }
        Ok(self)
    }

    /// Stages everything and commits.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.git.commit_all(message)
    }

    /// Adds the `foo` template with one version carrying questions, and
    /// commits it.
    pub fn with_foo(self) -> Result<Self> {
        self.write(
            "foo/config.yml",
            "name: Foo\ncategory: Database\ndescription: A test database\ndefaultVersion: \"1\"\n",
        )?
        .write("foo/catalogIcon-foo.svg", "<svg/>")?
        .write("foo/1/docker-compose.yml", "db:\n  image: foo:1\n")?
        .write(
            "foo/1/rancher-compose.yml",
            ".catalog:\n  name: Foo\n  questions:\n    - variable: scale\n      label: Scale\n      type: int\n      default: 3\n",
        )?;
        self.commit("Add foo")?;
        Ok(self)
    }

    /// `file://` URL of the upstream repository.
    pub fn url(&self) -> String {
        self.git.file_url()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A not yet existing directory for a local mirror.
    pub fn mirror_dir(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    /// Scratch directory for config and log files.
    pub fn scratch(&self) -> &Path {
        self.temp.path()
    }
}

/// The service binary with a clean `CATALOG_*` environment.
pub fn catalog_cmd() -> Command {
    let mut cmd = Command::cargo_bin("catalog-service").expect("binary is built for tests");
    for var in CATALOG_ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// The service binary pointed at `upstream`, mirroring into `data_dir`.
pub fn catalog_cmd_for(upstream: &UpstreamCatalog, data_dir: &Path) -> Command {
    let mut cmd = catalog_cmd();
    cmd.arg("--catalog-url").arg(upstream.url()).arg("--data-dir").arg(data_dir);
    cmd
}
