//! Error handling for the catalog service
//!
//! The catalog distinguishes between errors that must stop the process (missing
//! configuration, a failed initial clone), errors a caller needs to react to
//! (an unknown template or version), and problems that are merely recorded
//! while the index keeps serving (a malformed `config.yml`, an unreadable
//! compose file, a failed periodic pull).
//!
//! The first two kinds are [`CatalogError`] values carried inside
//! [`anyhow::Error`]; callers recover the variant with
//! `error.downcast_ref::<CatalogError>()`. The third kind never leaves the
//! component that hit it: it is logged and stored as a [`Diagnostic`] on the
//! result being built.
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_service::core::{CatalogError, user_friendly_error};
//!
//! let error = anyhow::Error::from(CatalogError::GitNotFound);
//! let context = user_friendly_error(error);
//! context.display(); // Prints a colored error with a suggestion
//! ```

use colored::Colorize;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Typed failures surfaced by the catalog service.
///
/// Variants are grouped by the part of the system that produces them:
/// - configuration: [`ConfigError`]
/// - sync source: [`GitNotFound`], [`GitCommandError`], [`GitCloneFailed`]
/// - lookups: [`TemplateNotFound`], [`VersionNotFound`], [`InvalidIdentifier`]
/// - parsing: [`QuestionSectionConflict`], [`YamlError`]
///
/// [`ConfigError`]: CatalogError::ConfigError
/// [`GitNotFound`]: CatalogError::GitNotFound
/// [`GitCommandError`]: CatalogError::GitCommandError
/// [`GitCloneFailed`]: CatalogError::GitCloneFailed
/// [`TemplateNotFound`]: CatalogError::TemplateNotFound
/// [`VersionNotFound`]: CatalogError::VersionNotFound
/// [`InvalidIdentifier`]: CatalogError::InvalidIdentifier
/// [`QuestionSectionConflict`]: CatalogError::QuestionSectionConflict
/// [`YamlError`]: CatalogError::YamlError
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Git executable not found in PATH
    ///
    /// The catalog mirror is maintained with the system `git` binary, so the
    /// service cannot bootstrap without it.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Git operation failed during execution
    ///
    /// # Fields
    /// - `operation`: The git operation that failed (e.g., "pull")
    /// - `stderr`: The error output from the git command
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Cloning the catalog repository failed
    #[error("Failed to clone catalog repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone
        url: String,
        /// The reason for the clone failure
        reason: String,
    },

    /// No template directory with this identifier exists
    #[error("Template '{template}' not found")]
    TemplateNotFound {
        /// The requested template identifier
        template: String,
    },

    /// The template exists but has no such version directory
    #[error("Version '{version}' not found for template '{template}'")]
    VersionNotFound {
        /// The requested template identifier
        template: String,
        /// The requested version label
        version: String,
    },

    /// A template id or version label that cannot name a single directory
    #[error("Invalid catalog identifier: '{value}'")]
    InvalidIdentifier {
        /// The rejected identifier
        value: String,
    },

    /// More than one compose section declares a `questions` list
    #[error("Multiple sections declare questions in {file}: {}", .sections.join(", "))]
    QuestionSectionConflict {
        /// The orchestration compose file
        file: String,
        /// Names of the sections that declare questions
        sections: Vec<String>,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl CatalogError {
    /// Returns `true` for lookup failures a caller should report as "not found".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. } | Self::VersionNotFound { .. })
    }
}

/// A recoverable problem recorded while indexing or reading a template.
///
/// Diagnostics travel with the value they describe so that a caller can see
/// why a field is empty without the operation failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The file or directory the problem relates to
    pub path: PathBuf,
    /// Human readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic for `path`.
    pub fn new(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Error wrapper with a suggestion and details for CLI display.
///
/// ```rust,no_run
/// use catalog_service::core::{CatalogError, ErrorContext};
///
/// let context = ErrorContext::new(CatalogError::GitNotFound)
///     .with_suggestion("Install git from https://git-scm.com/")
///     .with_details("The catalog mirror is maintained with git");
///
/// println!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CatalogError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: CatalogError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// [`CatalogError`] variants get tailored suggestions; anything else is
/// reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(catalog_error) = error.downcast_ref::<CatalogError>() {
        return create_error_context(catalog_error, &error);
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(CatalogError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of the file passed with --config");
    }

    ErrorContext::new(CatalogError::Other {
        message: with_cause_chain(&error),
    })
}

fn with_cause_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Picks the fix for a configuration error from the setting it names.
fn config_suggestion(message: &str) -> &'static str {
    if message.contains("catalog_url") {
        "Pass the catalog repository with --catalog-url or set catalog_url in the --config file"
    } else if message.contains("refresh_interval") {
        "Pass --refresh-interval (or set refresh_interval) to a number of seconds, at least 1"
    } else if message.contains("git_timeout") {
        "Pass --git-timeout (or set git_timeout) to a number of seconds, at least 1"
    } else if message.contains("log file") {
        "Check that the directory of --log-file exists and is writable"
    } else {
        "Check the file passed with --config and the command-line flags"
    }
}

fn create_error_context(error: &CatalogError, source: &anyhow::Error) -> ErrorContext {
    match error {
        CatalogError::ConfigError {
            message,
        } => ErrorContext::new(CatalogError::ConfigError {
            message: message.clone(),
        })
        .with_suggestion(config_suggestion(message)),
        CatalogError::GitNotFound => ErrorContext::new(CatalogError::GitNotFound)
            .with_suggestion("Install git from https://git-scm.com/ and make sure it is on your PATH")
            .with_details("The catalog mirror is cloned and pulled with the system git command"),
        CatalogError::GitCloneFailed {
            url,
            reason,
        } => ErrorContext::new(CatalogError::GitCloneFailed {
            url: url.clone(),
            reason: reason.clone(),
        })
        .with_suggestion("Check that the catalog URL is correct and reachable from this host")
        .with_details(reason.trim().to_string()),
        CatalogError::GitCommandError {
            operation,
            stderr,
        } => ErrorContext::new(CatalogError::GitCommandError {
            operation: operation.clone(),
            stderr: stderr.clone(),
        })
        .with_details(stderr.trim().to_string()),
        CatalogError::TemplateNotFound {
            template,
        } => ErrorContext::new(CatalogError::TemplateNotFound {
            template: template.clone(),
        })
        .with_suggestion("Run the 'list' command to see the available templates"),
        CatalogError::VersionNotFound {
            template,
            version,
        } => ErrorContext::new(CatalogError::VersionNotFound {
            template: template.clone(),
            version: version.clone(),
        })
        .with_suggestion(format!(
            "Run the 'list' command and check the version links of '{template}'"
        )),
        CatalogError::InvalidIdentifier {
            value,
        } => ErrorContext::new(CatalogError::InvalidIdentifier {
            value: value.clone(),
        })
        .with_details("Identifiers are single directory names without path separators"),
        _ => ErrorContext::new(CatalogError::Other {
            message: with_cause_chain(source),
        }),
    }
}
