//! `show`: print the detail of one template version.

use super::OutputFormat;
use crate::config::CatalogConfig;
use crate::service::CatalogService;
use crate::template::TemplateVersion;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Bootstrap the catalog once and print one version with inherited metadata.
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Template id (its directory name)
    pub template: String,

    /// Version label (the version directory name)
    pub version: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl ShowCommand {
    pub async fn execute(self, config: &CatalogConfig) -> Result<()> {
        let service = CatalogService::start(config).await?;
        let detail = service.get_template_version(&self.template, &self.version)?;
        for diagnostic in &detail.diagnostics {
            tracing::warn!(target: "catalog", "{}", diagnostic);
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detail)?),
            OutputFormat::Text => print_text(&detail),
        }
        Ok(())
    }
}

fn print_text(detail: &TemplateVersion) {
    println!("{} {}", detail.id.bold(), detail.name);
    println!("  category:    {}", detail.category);
    println!("  description: {}", detail.description);
    if let Some(icon) = &detail.icon_path {
        println!("  icon:        {icon}");
    }
    if detail.questions.is_empty() {
        println!("  questions:   none");
    } else {
        println!("  questions:");
        for question in &detail.questions {
            let required = if question.required { " (required)".red().to_string() } else { String::new() };
            println!("    {} [{}]{}", question.variable.green(), question.kind, required);
        }
    }
    for diagnostic in &detail.diagnostics {
        println!("  {} {}", "warning:".yellow(), diagnostic);
    }
}
