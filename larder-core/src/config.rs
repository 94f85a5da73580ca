//! Scrape configuration from environment variables.

use std::env;

use crate::error::ConfigError;
use crate::types::ExtractionMethod;

/// Default scraper order.
pub const DEFAULT_SCRAPERS: &str = "json_ld,microdata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Scrapers to try, in order.
    pub scrapers: Vec<ExtractionMethod>,
    /// Render printed records as indented JSON.
    pub print_pretty: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            scrapers: ExtractionMethod::ALL.to_vec(),
            print_pretty: false,
        }
    }
}

impl ScrapeConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `LARDER_SCRAPERS`: Comma-separated scraper order (default: "json_ld,microdata")
    /// - `LARDER_PRINT_PRETTY`: Pretty-print records (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let scrapers = env::var("LARDER_SCRAPERS").unwrap_or_else(|_| DEFAULT_SCRAPERS.to_string());
        let scrapers = parse_scrapers(&scrapers)?;

        let print_pretty = env::var("LARDER_PRINT_PRETTY")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            scrapers,
            print_pretty,
        })
    }
}

/// Parse a comma-separated scraper list. Duplicates keep their first position.
pub fn parse_scrapers(list: &str) -> Result<Vec<ExtractionMethod>, ConfigError> {
    let mut scrapers = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let method: ExtractionMethod = name.parse()?;
        if !scrapers.contains(&method) {
            scrapers.push(method);
        }
    }

    if scrapers.is_empty() {
        return Err(ConfigError::NoScrapers);
    }
    Ok(scrapers)
}
