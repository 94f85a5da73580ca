use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A hook every site scraper must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    TestForMetadata,
    FindRecipeItem,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::TestForMetadata => "testForMetadata",
            Hook::FindRecipeItem => "findRecipeItem",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("{hook} function must be implemented by child class")]
    ContractViolation { hook: Hook },

    #[error("no meta data was found")]
    MissingMetadata { scraper_type: Option<String> },

    #[error("found metadata, but no recipe information")]
    MissingRecipeItem { scraper_type: Option<String> },
}

impl ScrapeError {
    /// The site identifier of the scraper that failed, if it declared one.
    pub fn scraper_type(&self) -> Option<&str> {
        match self {
            ScrapeError::ContractViolation { .. } => None,
            ScrapeError::MissingMetadata { scraper_type }
            | ScrapeError::MissingRecipeItem { scraper_type } => scraper_type.as_deref(),
        }
    }

    /// Structured form of the error, as reported to callers and the CLI.
    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            message: self.to_string(),
            scraper_type: self.scraper_type().map(str::to_string),
        }
    }
}

/// Serializes to `{message}` or `{message, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scraper_type: Option<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown scraper: {0}")]
    UnknownScraper(String),

    #[error("No scrapers configured")]
    NoScrapers,
}
