//! The in-memory catalog index
//!
//! [`CatalogIndex`] owns the published mapping from template id to
//! [`TemplateSummary`]. A rebuild walks the template root into a brand new
//! mapping and publishes it with a single swap of an `Arc` handle, so readers
//! always see one complete [`CatalogSnapshot`]: the one before the rebuild or
//! the one after it, never a mixture. The lock only guards the handle and
//! the generation number; the mapping is built before it is taken.
//!
//! Version detail is not cached. [`CatalogIndex::get_version`] reads the
//! version directory on every call and fills in metadata the version does not
//! carry itself (configuration, icon) from the parent template's summary in
//! the current snapshot.
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_service::catalog::CatalogIndex;
//!
//! # fn example() -> anyhow::Result<()> {
//! let index = CatalogIndex::new("./DATA/templates");
//! let report = index.rebuild();
//! println!("indexed {} templates", report.templates);
//!
//! for summary in index.list() {
//!     println!("{} ({})", summary.id, summary.category);
//! }
//!
//! let detail = index.get_version("mysql", "1")?;
//! println!("{} questions", detail.questions.len());
//! # Ok(())
//! # }
//! ```

use crate::core::{CatalogError, Diagnostic};
use crate::template::parser::{parse_template_directory, parse_version_directory};
use crate::template::{TemplateSummary, TemplateVersion};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable, complete view of the catalog as of one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Increases by one with every published rebuild; 0 before the first
    pub generation: u64,
    /// When this snapshot was published
    pub refreshed_at: Option<DateTime<Utc>>,
    pub templates: BTreeMap<String, TemplateSummary>,
}

impl CatalogSnapshot {
    fn empty() -> Self {
        Self {
            generation: 0,
            refreshed_at: None,
            templates: BTreeMap::new(),
        }
    }

    /// Looks up a template summary by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TemplateSummary> {
        self.templates.get(id)
    }
}

/// Outcome of one [`CatalogIndex::rebuild`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Generation of the snapshot this rebuild published
    pub generation: u64,
    /// Number of templates in the published snapshot
    pub templates: usize,
    /// Template directories left out because they could not be read
    pub skipped: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The catalog index over a template root directory.
#[derive(Debug)]
pub struct CatalogIndex {
    root: PathBuf,
    published: RwLock<Arc<CatalogSnapshot>>,
}

impl CatalogIndex {
    /// Creates an empty index over `root`. Nothing is read until
    /// [`rebuild`](Self::rebuild).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            published: RwLock::new(Arc::new(CatalogSnapshot::empty())),
        }
    }

    /// The template root this index reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the currently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self.published.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Swaps in `templates` as the next generation and returns its number.
    ///
    /// The generation is taken under the write lock, so publication order
    /// always matches generation order.
    fn publish(&self, templates: BTreeMap<String, TemplateSummary>) -> u64 {
        let mut guard = self.published.write().unwrap_or_else(PoisonError::into_inner);
        let generation = guard.generation + 1;
        *guard = Arc::new(CatalogSnapshot {
            generation,
            refreshed_at: Some(Utc::now()),
            templates,
        });
        generation
    }

    /// Walks the template root and atomically publishes a fresh mapping.
    ///
    /// Every immediate, non-hidden subdirectory of the root is a template.
    /// A template directory that cannot be listed is skipped; a missing or
    /// unreadable root publishes an empty catalog. Either way the problem is
    /// recorded in the returned report.
    pub fn rebuild(&self) -> RebuildReport {
        let mut report = RebuildReport::default();
        let mut templates = BTreeMap::new();

        match template_directories(&self.root) {
            Ok(ids) => {
                for id in ids {
                    tracing::debug!(target: "catalog", "Reading metadata folder for template: {}", id);
                    match parse_template_directory(&self.root, &id) {
                        Ok(parsed) => {
                            report.diagnostics.extend(parsed.diagnostics);
                            templates.insert(id, parsed.value);
                        }
                        Err(e) => {
                            tracing::error!(target: "catalog", "Skipping template {}: {:#}", id, e);
                            report.diagnostics.push(Diagnostic::new(self.root.join(&id), format!("{e:#}")));
                            report.skipped.push(id);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(
                    target: "catalog",
                    "Error reading template root {}: {}",
                    self.root.display(),
                    e
                );
                report.diagnostics.push(Diagnostic::new(&self.root, e.to_string()));
            }
        }

        report.templates = templates.len();
        let generation = self.publish(templates);
        report.generation = generation;

        tracing::info!(
            target: "catalog",
            "Published catalog generation {} with {} templates ({} skipped)",
            generation,
            report.templates,
            report.skipped.len()
        );
        report
    }

    /// Returns copies of all template summaries in the published snapshot,
    /// ordered by id. Empty until the first rebuild.
    #[must_use]
    pub fn list(&self) -> Vec<TemplateSummary> {
        self.snapshot().templates.values().cloned().collect()
    }

    /// Reads one version directory and resolves it against its template.
    ///
    /// Name, category, description and default version come from the
    /// version's own `config.yml` when it has a readable one, otherwise from
    /// the parent template's summary; the icon likewise. When the parent is
    /// not in the published snapshot, the inherited fields stay empty and a
    /// diagnostic is recorded.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidIdentifier`] if either identifier is not a
    ///   single plain directory name
    /// - [`CatalogError::TemplateNotFound`] / [`CatalogError::VersionNotFound`]
    ///   if the directory does not exist
    pub fn get_version(&self, template_id: &str, version: &str) -> Result<TemplateVersion> {
        validate_identifier(template_id)?;
        validate_identifier(version)?;

        let version_dir = self.root.join(template_id).join(version);
        if !version_dir.is_dir() {
            if self.root.join(template_id).is_dir() {
                return Err(CatalogError::VersionNotFound {
                    template: template_id.to_string(),
                    version: version.to_string(),
                }
                .into());
            }
            return Err(CatalogError::TemplateNotFound {
                template: template_id.to_string(),
            }
            .into());
        }

        let contents = parse_version_directory(&self.root, template_id, version)?;
        let snapshot = self.snapshot();
        let parent = snapshot.get(template_id);

        let mut detail = TemplateVersion {
            id: format!("{template_id}/{version}"),
            path: format!("{template_id}/{version}"),
            template_id: template_id.to_string(),
            version: version.to_string(),
            docker_manifest: contents.docker_manifest,
            orchestration_manifest: contents.orchestration_manifest,
            questions: contents.questions,
            diagnostics: contents.diagnostics,
            ..TemplateVersion::default()
        };

        let needs_parent = contents.config.is_none() || contents.icon_path.is_none();
        if needs_parent && parent.is_none() {
            tracing::debug!(target: "catalog", "Could not find the parent metadata {}", template_id);
            detail.diagnostics.push(Diagnostic::new(
                &version_dir,
                format!("parent template '{template_id}' is not in the published catalog"),
            ));
        }

        match contents.config {
            Some(config) => {
                detail.name = config.name.unwrap_or_default();
                detail.category = config.category.unwrap_or_default();
                detail.description = config.description.unwrap_or_default();
                detail.default_version = config.default_version.unwrap_or_default();
            }
            None => {
                if let Some(parent) = parent {
                    detail.name.clone_from(&parent.name);
                    detail.category.clone_from(&parent.category);
                    detail.description.clone_from(&parent.description);
                    detail.default_version.clone_from(&parent.default_version);
                }
            }
        }

        detail.icon_path = contents.icon_path.or_else(|| parent.and_then(|p| p.icon_path.clone()));

        Ok(detail)
    }
}

/// Immediate, non-hidden subdirectories of `root`, sorted.
fn template_directories(root: &Path) -> std::io::Result<Vec<String>> {
    let mut ids = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') && entry.path().is_dir() {
            ids.push(name);
        }
    }
    ids.sort();
    Ok(ids)
}

/// Accepts only identifiers that name exactly one directory below its parent.
fn validate_identifier(value: &str) -> Result<(), CatalogError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
        || value.contains('\0');
    if invalid {
        return Err(CatalogError::InvalidIdentifier {
            value: value.to_string(),
        });
    }
    Ok(())
}
