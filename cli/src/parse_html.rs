use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use larder_core::config::parse_scrapers;
use larder_core::{scrape_html, PropertyMapper, RecipeSink, ScrapeConfig, TracingSink};

/// Scrape a recipe from an HTML file.
/// Outputs JSON to stdout (either the scrape output on success or the error payload on failure).
pub fn parse_html(file: &Path, scrapers: &[String], print: bool, pretty: bool) -> Result<()> {
    let html = fs::read_to_string(file)
        .with_context(|| format!("Failed to read HTML file: {}", file.display()))?;

    let mut config = ScrapeConfig::from_env().context("Invalid LARDER_SCRAPERS")?;
    if !scrapers.is_empty() {
        config.scrapers = parse_scrapers(&scrapers.join(",")).context("Invalid --scraper")?;
    }
    config.print_pretty |= pretty;

    tracing::debug!(scrapers = ?config.scrapers, "Scraping {}", file.display());
    let mapper = PropertyMapper::standard();
    let sink = TracingSink::new(config.print_pretty);
    let sink = print.then_some(&sink as &dyn RecipeSink);
    match scrape_html(&html, &config, &mapper, sink) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            let error_json = serde_json::json!({
                "error": e.payload()
            });
            println!("{}", serde_json::to_string_pretty(&error_json)?);
            // Return error so exit code is non-zero
            Err(anyhow::anyhow!("Failed to scrape recipe: {}", e))
        }
    }
}
