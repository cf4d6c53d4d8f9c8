//! Test utilities for the catalog service
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests:
//! - [`CatalogFixture`] - a template root in a temporary directory
//! - [`ScriptedSyncSource`] - a counting, controllable sync source
//! - [`TestGit`] - a thin runner for building upstream git repositories
//! - [`init_test_logging`] - one-time tracing setup honoring `RUST_LOG`

pub mod fixtures;
pub mod git_helper;
pub mod sync_source;

pub use fixtures::CatalogFixture;
pub use git_helper::TestGit;
pub use sync_source::ScriptedSyncSource;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG` if set; with neither, tests
/// run without a subscriber.
///
/// ```bash
/// RUST_LOG=catalog=debug,refresh=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
