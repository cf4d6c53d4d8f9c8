//! Catalog Service entry point
//!
//! Parses the command line, runs the selected command, and turns any error
//! into a colored message with a suggestion before exiting with status 1.
//!
//! - `serve` - mirror the catalog and keep it refreshed
//! - `list` - print the template listing
//! - `show` - print one template version

use anyhow::Result;
use catalog_service::cli;
use catalog_service::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
