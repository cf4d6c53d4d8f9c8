//! Integration test suite for the catalog service
//!
//! End-to-end tests against real git repositories created in temporary
//! directories and served over `file://` URLs.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **refresh**: bootstrap, pull-driven refresh and stale serving through the library
//! - **cli**: the `list` and `show` commands and configuration errors

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod refresh;
