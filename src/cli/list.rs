//! `list`: print the template listing.

use super::OutputFormat;
use crate::config::CatalogConfig;
use crate::service::CatalogService;
use crate::template::TemplateSummary;
use anyhow::Result;
use clap::Args;
use colored::Colorize;

/// Bootstrap the catalog once and print every template.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Only show templates in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl ListCommand {
    pub async fn execute(self, config: &CatalogConfig) -> Result<()> {
        let service = CatalogService::start(config).await?;
        let templates = self.filter(service.list_templates());

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&templates)?),
            OutputFormat::Text => print_text(&templates),
        }
        Ok(())
    }

    fn filter(&self, templates: Vec<TemplateSummary>) -> Vec<TemplateSummary> {
        match &self.category {
            Some(category) => templates
                .into_iter()
                .filter(|t| t.category.eq_ignore_ascii_case(category))
                .collect(),
            None => templates,
        }
    }
}

fn print_text(templates: &[TemplateSummary]) {
    if templates.is_empty() {
        println!("{}", "No templates found.".yellow());
        return;
    }
    for template in templates {
        let versions: Vec<&str> = template.version_links.keys().map(String::as_str).collect();
        println!(
            "{} {} [{}]",
            template.id.bold(),
            template.name,
            template.category.cyan()
        );
        if !template.description.is_empty() {
            println!("    {}", template.description.dimmed());
        }
        println!(
            "    versions: {} (default {})",
            versions.join(", "),
            if template.default_version.is_empty() { "-" } else { template.default_version.as_str() }
        );
    }
}
