use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::model::RecipeModel;

/// Raw recipe record as located by a scraper: field name -> raw value.
pub type RecipeItem = Map<String, Value>;

/// Whitelisted, transformed subset of a [`RecipeItem`].
pub type FinalRecipe = Map<String, Value>;

/// Identifies which bundled scraper produced a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    JsonLd,
    Microdata,
}

impl ExtractionMethod {
    /// All bundled scrapers in default order
    pub const ALL: &'static [ExtractionMethod] =
        &[ExtractionMethod::JsonLd, ExtractionMethod::Microdata];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::JsonLd => "json_ld",
            ExtractionMethod::Microdata => "microdata",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "json_ld" | "jsonld" => Ok(ExtractionMethod::JsonLd),
            "microdata" => Ok(ExtractionMethod::Microdata),
            other => Err(ConfigError::UnknownScraper(other.to_string())),
        }
    }
}

/// Result of attempting a single scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionAttempt {
    pub method: ExtractionMethod,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Output of running the scraper chain over one document
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutput {
    /// Record as the winning scraper found it
    pub recipe_item: RecipeItem,
    /// Record after the mapping table was applied
    pub final_recipe: FinalRecipe,
    pub recipe: RecipeModel,
    pub method_used: ExtractionMethod,
    /// Results from all attempted scrapers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_attempts: Vec<ExtractionAttempt>,
}
