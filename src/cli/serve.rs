//! `serve`: keep the catalog mirrored and indexed until interrupted.

use crate::config::CatalogConfig;
use crate::service::CatalogService;
use anyhow::{Context, Result};
use clap::Args;

/// Bootstrap the catalog, then refresh it on the configured interval.
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Run one extra refresh right after bootstrap
    #[arg(long)]
    pub refresh_now: bool,
}

impl ServeCommand {
    pub async fn execute(self, config: &CatalogConfig) -> Result<()> {
        let service = CatalogService::start(config).await?;
        let snapshot = service.snapshot();
        tracing::info!(
            "Serving {} templates from {} (refresh every {}s)",
            snapshot.templates.len(),
            config.template_root().display(),
            config.refresh_interval
        );

        if self.refresh_now {
            let _ = service.trigger_refresh();
        }
        let poll = service.start_background_poll();

        tokio::signal::ctrl_c().await.context("Failed to listen for shutdown signal")?;
        tracing::info!("Shutting down");
        poll.abort();
        Ok(())
    }
}
