//! Command-line interface for the catalog service.
//!
//! Global flags describe the catalog and how to mirror it; subcommands decide
//! what to do with it:
//!
//! - `serve` keeps the catalog refreshed in the background until interrupted
//! - `list` prints the template listing
//! - `show <template> <version>` prints the detail of one version
//!
//! Every flag can also be set from a `CATALOG_*` environment variable, and a
//! TOML file given with `--config` supplies values below the flags. See
//! [`crate::config`] for the file format.
//!
//! # Examples
//!
//! ```bash
//! catalog-service --catalog-url https://github.com/example/catalog.git serve
//! CATALOG_URL=file:///srv/catalog.git catalog-service list --format text
//! catalog-service --config catalog.toml show mysql 1
//! ```
//!
//! Logs go to stderr (or `--log-file`), so `list` and `show` output can be
//! piped as JSON.

mod list;
mod serve;
mod show;

pub use list::ListCommand;
pub use serve::ServeCommand;
pub use show::ShowCommand;

use crate::config::{CatalogConfig, ConfigOverrides};
use crate::core::CatalogError;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Catalog Service - serve an in-memory index of a Git template catalog.
#[derive(Parser, Debug)]
#[command(
    name = "catalog-service",
    about = "Catalog Service - an in-memory, periodically refreshed index of Git-hosted templates",
    version,
    long_about = "Mirrors a catalog repository into a local directory, indexes its templates \
                  and keeps the index fresh by pulling on a fixed interval."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog repository to mirror (required)
    #[arg(long, global = true, env = "CATALOG_URL", value_name = "URL")]
    catalog_url: Option<String>,

    /// Seconds between background refreshes [default: 60]
    #[arg(long, global = true, env = "CATALOG_REFRESH_INTERVAL", value_name = "SECONDS")]
    refresh_interval: Option<u64>,

    /// Local mirror directory [default: ./DATA]
    #[arg(long, global = true, env = "CATALOG_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Template root inside the mirror [default: templates]
    #[arg(long, global = true, env = "CATALOG_TEMPLATES_DIR", value_name = "DIR")]
    templates_dir: Option<PathBuf>,

    /// Branch to pull instead of the tracking branch
    #[arg(long, global = true, env = "CATALOG_BRANCH")]
    branch: Option<String>,

    /// Seconds allowed for one clone or pull [default: 300]
    #[arg(long, global = true, env = "CATALOG_GIT_TIMEOUT", value_name = "SECONDS")]
    git_timeout: Option<u64>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, env = "CATALOG_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long = "debug", global = true, env = "CATALOG_DEBUG")]
    debug: bool,

    /// TOML configuration file; flags override its values
    #[arg(short, long, global = true, env = "CATALOG_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Mirror the catalog and keep it refreshed until interrupted
    Serve(ServeCommand),
    /// Print all templates in the catalog
    List(ListCommand),
    /// Print the detail of one template version
    Show(ShowCommand),
}

/// Output format of the read commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl Cli {
    /// Resolve configuration, set up logging and run the subcommand.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config().await?;
        init_logging(config.debug, config.log_file.as_deref())?;
        tracing::debug!("Resolved configuration: {:?}", config);

        match self.command {
            Commands::Serve(cmd) => cmd.execute(&config).await,
            Commands::List(cmd) => cmd.execute(&config).await,
            Commands::Show(cmd) => cmd.execute(&config).await,
        }
    }

    /// Layers the command-line values over the `--config` file (or the
    /// defaults) and validates the result.
    pub async fn build_config(&self) -> Result<CatalogConfig> {
        let config = CatalogConfig::load_with_optional(self.config.as_deref())
            .await?
            .merge(self.overrides());
        config.validate()?;
        Ok(config)
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            catalog_url: self.catalog_url.clone(),
            refresh_interval: self.refresh_interval,
            data_dir: self.data_dir.clone(),
            templates_dir: self.templates_dir.clone(),
            branch: self.branch.clone(),
            git_timeout: self.git_timeout,
            log_file: self.log_file.clone(),
            debug: self.debug,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG`, when set, replaces the level chosen by `debug`. With
/// `log_file`, output is appended to that file without color codes.
///
/// # Errors
///
/// Fails if the log file cannot be opened.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(if debug { "debug" } else { "info" })
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(debug);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))
                .map_err(|e| CatalogError::ConfigError {
                    message: format!("{e:#}"),
                })?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
