//! Reading template and version directories from the catalog mirror
//!
//! Parsing never fails on the content of an individual file: an unreadable or
//! malformed file is logged, recorded as a [`Diagnostic`] and treated as
//! absent while the rest of the directory is processed. Only failing to list
//! the directory itself is an error, since then nothing can be said about the
//! template or version at all.

use super::{
    CONFIG_PREFIX, DOCKER_COMPOSE_PREFIX, ICON_PREFIX, Question, RANCHER_COMPOSE_PREFIX,
    TemplateConfig, TemplateSummary,
};
use crate::core::{CatalogError, Diagnostic};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A parse result together with the problems met while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    fn new(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            value,
            diagnostics,
        }
    }
}

/// Everything read from one version directory, before inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionContents {
    /// The version's own configuration, if a readable `config.yml*` exists
    pub config: Option<TemplateConfig>,
    /// The version's own icon, relative to the template root
    pub icon_path: Option<String>,
    pub docker_manifest: Option<String>,
    pub orchestration_manifest: Option<String>,
    pub questions: Vec<Question>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A directory entry with the bits the classifier needs.
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Lists `dir`, sorted by file name so repeated reads classify identically.
fn list_entries(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: path.is_dir(),
            path,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Reads and parses a flat key/value configuration file.
///
/// An empty file is a valid, empty configuration.
pub fn read_config_file(path: &Path) -> Result<TemplateConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(TemplateConfig::default());
    }
    let config = serde_yaml::from_str(&content)
        .map_err(CatalogError::from)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

fn describe(error: &anyhow::Error) -> String {
    format!("{error:#}")
}

/// Reads `config.yml` at the root of `dir`.
///
/// A missing or malformed file yields an empty configuration plus a diagnostic.
pub fn parse_template_config(dir: &Path) -> Parsed<TemplateConfig> {
    let path = dir.join(CONFIG_PREFIX);
    match read_config_file(&path) {
        Ok(config) => Parsed::new(config, Vec::new()),
        Err(e) => {
            tracing::warn!(target: "catalog", "Error reading config under {}: {:#}", dir.display(), e);
            Parsed::new(TemplateConfig::default(), vec![Diagnostic::new(&path, describe(&e))])
        }
    }
}

/// Builds the summary for the template directory `root/id`.
///
/// Immediate subdirectories become version links and a `catalogIcon*` file
/// becomes the icon. Dot-directories are skipped.
///
/// # Errors
///
/// Returns an error if the template directory cannot be listed; the caller
/// leaves such a template out of the index.
pub fn parse_template_directory(root: &Path, id: &str) -> Result<Parsed<TemplateSummary>> {
    let dir = root.join(id);
    let entries = list_entries(&dir)
        .with_context(|| format!("Failed to list template directory {}", dir.display()))?;

    let config = parse_template_config(&dir);
    let mut summary = TemplateSummary::new(id);
    summary.apply_config(&config.value);

    for entry in entries {
        if entry.is_dir {
            if !is_hidden(&entry.name) {
                summary.version_links.insert(entry.name.clone(), format!("{id}/{}", entry.name));
            }
        } else if entry.name.starts_with(ICON_PREFIX) {
            summary.icon_path = Some(format!("{id}/{}", entry.name));
        }
    }

    Ok(Parsed::new(summary, config.diagnostics))
}

/// Reads the version directory `root/template_id/version`.
///
/// Entries are classified by file name prefix:
/// - `config.yml*` is the version's own configuration
/// - `catalogIcon*` is the version's own icon
/// - `docker-compose*` is kept verbatim as the deployment manifest
/// - `rancher-compose*` is kept verbatim and its `questions` are extracted
///
/// Anything else is ignored.
///
/// # Errors
///
/// Returns an error if the version directory cannot be listed.
pub fn parse_version_directory(
    root: &Path,
    template_id: &str,
    version: &str,
) -> Result<VersionContents> {
    let dir = root.join(template_id).join(version);
    let entries = list_entries(&dir)
        .with_context(|| format!("Failed to list version directory {}", dir.display()))?;

    let mut contents = VersionContents::default();

    for entry in entries.into_iter().filter(|e| !e.is_dir) {
        if entry.name.starts_with(CONFIG_PREFIX) {
            match read_config_file(&entry.path) {
                Ok(config) => contents.config = Some(config),
                Err(e) => {
                    tracing::warn!(target: "catalog", "Ignoring {}: {:#}", entry.path.display(), e);
                    contents.diagnostics.push(Diagnostic::new(&entry.path, describe(&e)));
                }
            }
        } else if entry.name.starts_with(ICON_PREFIX) {
            contents.icon_path = Some(format!("{template_id}/{version}/{}", entry.name));
        } else if entry.name.starts_with(DOCKER_COMPOSE_PREFIX) {
            if let Some(text) = read_manifest(&entry.path, &mut contents.diagnostics) {
                contents.docker_manifest = Some(text);
            }
        } else if entry.name.starts_with(RANCHER_COMPOSE_PREFIX) {
            if let Some(text) = read_manifest(&entry.path, &mut contents.diagnostics) {
                match parse_questions(&text, &entry.name) {
                    Ok(questions) => contents.questions = questions,
                    Err(e) => {
                        tracing::warn!(
                            target: "catalog",
                            "Error reading questions from {}: {:#}",
                            entry.path.display(),
                            e
                        );
                        contents.questions.clear();
                        contents.diagnostics.push(Diagnostic::new(&entry.path, describe(&e)));
                    }
                }
                contents.orchestration_manifest = Some(text);
            }
        }
    }

    Ok(contents)
}

fn read_manifest(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(target: "catalog", "Error reading file {}: {}", path.display(), e);
            diagnostics.push(Diagnostic::new(path, e.to_string()));
            None
        }
    }
}

/// Extracts the question list from an orchestration compose document.
///
/// The document is a mapping of named sections; at most one of them may
/// carry a `questions` list. Sections without questions (service scale
/// settings and the like) are ignored.
///
/// # Errors
///
/// Fails if the document is not valid YAML, is not a mapping, has a
/// malformed `questions` list, or declares questions in more than one
/// section ([`CatalogError::QuestionSectionConflict`]).
pub fn parse_questions(text: &str, file_name: &str) -> Result<Vec<Question>> {
    let document: serde_yaml::Value = serde_yaml::from_str(text).map_err(CatalogError::from)?;
    let sections = match document {
        serde_yaml::Value::Null => return Ok(Vec::new()),
        serde_yaml::Value::Mapping(sections) => sections,
        _ => {
            return Err(CatalogError::Other {
                message: format!("{file_name} is not a mapping of sections"),
            }
            .into());
        }
    };

    let mut found: Vec<(String, Vec<Question>)> = Vec::new();
    for (key, section) in sections {
        let Some(questions) = section.get("questions") else {
            continue;
        };
        let name = key.as_str().map_or_else(|| format!("{key:?}"), ToString::to_string);
        let questions: Vec<Question> = serde_yaml::from_value(questions.clone())
            .map_err(CatalogError::from)
            .with_context(|| format!("Invalid questions in section '{name}'"))?;
        found.push((name, questions));
    }

    if found.len() > 1 {
        return Err(CatalogError::QuestionSectionConflict {
            file: file_name.to_string(),
            sections: found.into_iter().map(|(name, _)| name).collect(),
        }
        .into());
    }

    Ok(found.pop().map(|(_, questions)| questions).unwrap_or_default())
}
