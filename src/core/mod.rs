//! Core types shared by every part of the catalog service
//!
//! # Error Management
//!
//! - [`CatalogError`] - typed failures (configuration, git, lookups, parsing)
//! - [`Diagnostic`] - a recoverable problem recorded alongside a partial result
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI presentation with suggestions
//!
//! Only bootstrap failures and lookup misses travel as errors. Parse and
//! periodic sync problems are turned into [`Diagnostic`]s where they occur.

pub mod error;

pub use error::{CatalogError, Diagnostic, ErrorContext, user_friendly_error};
