//! Catalog Service
//!
//! An in-memory, periodically refreshed index of templates kept in a Git
//! catalog repository. The repository is mirrored into a local directory; a
//! directory walk over the mirror builds the index, and the index is swapped
//! in whole so readers never observe a half-built catalog.
//!
//! # Architecture
//!
//! - [`source`] keeps the local mirror present and up to date ([`git`] backs
//!   the production implementation)
//! - [`template`] parses template and version directories
//! - [`catalog`] holds the published index and resolves version detail,
//!   inheriting configuration and icon from the parent template
//! - [`refresh`] runs single-flight synchronize-then-rebuild cycles
//! - [`service`] ties these together behind the caller-facing operations
//! - [`config`] and [`cli`] assemble and run the service
//!
//! # Example
//!
//! ```rust,no_run
//! use catalog_service::config::CatalogConfig;
//! use catalog_service::service::CatalogService;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CatalogConfig {
//!     catalog_url: Some("https://github.com/example/catalog.git".to_string()),
//!     ..CatalogConfig::default()
//! };
//! let service = CatalogService::start(&config).await?;
//! let detail = service.get_template_version("mysql", "1")?;
//! println!("{}: {} questions", detail.name, detail.questions.len());
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod template;

// Mirror maintenance
pub mod git;
pub mod source;

// Orchestration
pub mod refresh;
pub mod service;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
