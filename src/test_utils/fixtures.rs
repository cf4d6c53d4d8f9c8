//! On-disk catalog fixtures
//!
//! [`CatalogFixture`] lays out a template root in a temporary directory:
//!
//! ```rust,ignore
//! let fixture = CatalogFixture::new()
//!     .template("foo", "name: Foo\ncategory: Database\n")
//!     .file("foo/1/docker-compose.yml", "web: {}\n");
//! let index = CatalogIndex::new(fixture.root());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary template root. Removed when dropped.
pub struct CatalogFixture {
    temp: TempDir,
    root: PathBuf,
}

impl Default for CatalogFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFixture {
    /// Creates an empty template root at `<tmp>/templates`.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = temp.path().join("templates");
        fs::create_dir_all(&root).expect("failed to create template root");
        Self {
            temp,
            root,
        }
    }

    /// Adds a template directory with the given `config.yml` content.
    #[must_use]
    pub fn template(self, id: &str, config: &str) -> Self {
        self.write(&format!("{id}/{}", crate::template::CONFIG_PREFIX), config);
        self
    }

    /// Adds a file at `relative` (below the template root), creating parents.
    #[must_use]
    pub fn file(self, relative: &str, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    /// Writes or overwrites a file below the template root.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture directory");
        }
        fs::write(&path, content).expect("failed to write fixture file");
    }

    /// Removes a file or directory below the template root.
    ///
    /// # Panics
    ///
    /// Panics if the entry cannot be removed.
    pub fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("failed to remove fixture directory");
        } else {
            fs::remove_file(&path).expect("failed to remove fixture file");
        }
    }

    /// The template root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory containing the template root, i.e. the mirror directory.
    pub fn mirror(&self) -> &Path {
        self.temp.path()
    }
}
