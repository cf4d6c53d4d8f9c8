//! Template data model and on-disk parsing
//!
//! A catalog repository holds one directory per template under the template
//! root. Each template directory carries a `config.yml`, optionally an icon
//! (`catalogIcon*`), and one subdirectory per version:
//!
//! ```text
//! templates/
//! └── mysql/
//!     ├── config.yml              name, category, description, defaultVersion
//!     ├── catalogIcon-mysql.svg
//!     ├── 0/
//!     │   ├── docker-compose.yml
//!     │   └── rancher-compose.yml questions live here
//!     └── 1/
//!         ├── config.yml          optional: overrides the template config
//!         ├── catalogIcon.png     optional: overrides the template icon
//!         ├── docker-compose.yml
//!         └── rancher-compose.yml
//! ```
//!
//! [`TemplateSummary`] is what the index stores per template directory;
//! [`TemplateVersion`] is built on demand for a single version directory.

pub mod parser;

use crate::core::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// File name prefix of template and version configuration files.
pub const CONFIG_PREFIX: &str = "config.yml";
/// File name prefix of icon assets.
pub const ICON_PREFIX: &str = "catalogIcon";
/// File name prefix of the primary deployment manifest.
pub const DOCKER_COMPOSE_PREFIX: &str = "docker-compose";
/// File name prefix of the orchestration compose file carrying the questions.
pub const RANCHER_COMPOSE_PREFIX: &str = "rancher-compose";

/// Flat key/value metadata read from a `config.yml`.
///
/// Unknown keys are ignored. Scalar values of any YAML type are accepted and
/// kept as their string form, so `defaultVersion: 2` reads as `"2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub description: Option<String>,
    #[serde(default, rename = "defaultVersion", deserialize_with = "scalar_string")]
    pub default_version: Option<String>,
}

/// One entry in the catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    /// Directory name; unique key in the index
    pub id: String,
    /// Path relative to the template root (same as `id`)
    pub path: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub default_version: String,
    /// Relative path of the template icon, e.g. `mysql/catalogIcon-mysql.svg`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// Version label to relative path, e.g. `"1" -> "mysql/1"`
    #[serde(default)]
    pub version_links: BTreeMap<String, String>,
}

impl TemplateSummary {
    /// Creates an empty summary for the template directory `id`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            path: id.clone(),
            id,
            ..Self::default()
        }
    }

    /// Copies name, category, description and default version from `config`.
    pub fn apply_config(&mut self, config: &TemplateConfig) {
        self.name = config.name.clone().unwrap_or_default();
        self.category = config.category.clone().unwrap_or_default();
        self.description = config.description.clone().unwrap_or_default();
        self.default_version = config.default_version.clone().unwrap_or_default();
    }
}

/// Fully resolved detail of one template version.
///
/// Built per request from the version directory; metadata missing from the
/// version directory has already been filled in from the parent template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    /// `"<templateId>/<versionLabel>"`
    pub id: String,
    /// Path relative to the template root (same as `id`)
    pub path: String,
    pub template_id: String,
    pub version: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub default_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_path: Option<String>,
    /// Raw contents of `docker-compose*`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_manifest: Option<String>,
    /// Raw contents of `rancher-compose*`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestration_manifest: Option<String>,
    pub questions: Vec<Question>,
    /// Problems met while reading or resolving this version
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// A user-facing question declared in an orchestration compose file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub variable: String,
    #[serde(default, deserialize_with = "scalar_string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "scalar_string_or_empty")]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl Question {
    /// Shorthand used by tests and fixtures.
    pub fn new(variable: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Bool(b) => Ok(Some(b.to_string())),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected a scalar value, found {other:?}"))),
    }
}

fn scalar_string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_string(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_accepts_non_string_scalars() {
        let config: TemplateConfig =
            serde_yaml::from_str("name: Foo\ndefaultVersion: 2\nextra: [1, 2]\n").unwrap();
        assert_eq!(config.name.as_deref(), Some("Foo"));
        assert_eq!(config.default_version.as_deref(), Some("2"));
        assert_eq!(config.category, None);
    }

    #[test]
    fn test_config_rejects_nested_known_key() {
        let result: Result<TemplateConfig, _> = serde_yaml::from_str("name:\n  first: Foo\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_question_fields() {
        let question: Question = serde_yaml::from_str(
            "variable: scale\nlabel: Scale\nrequired: true\ndefault: 3\ntype: int\n",
        )
        .unwrap();
        assert_eq!(question.variable, "scale");
        assert_eq!(question.label, "Scale");
        assert!(question.required);
        assert_eq!(question.default.as_deref(), Some("3"));
        assert_eq!(question.kind, "int");
        assert_eq!(question.description, "");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let mut summary = TemplateSummary::new("foo");
        summary.default_version = "1".to_string();
        summary.version_links.insert("1".to_string(), "foo/1".to_string());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["defaultVersion"], "1");
        assert_eq!(json["versionLinks"]["1"], "foo/1");
        assert!(json.get("iconPath").is_none());
    }
}
