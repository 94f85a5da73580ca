pub mod base;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod model;
pub mod property_mapper;
pub mod scrapers;
pub mod sink;
pub mod types;

pub use base::{map_recipe_item, Scraper, SiteScraper};
pub use config::ScrapeConfig;
pub use dynamic::{DynamicScraper, DynamicScraperBuilder};
pub use error::{ConfigError, ErrorPayload, Hook, ScrapeError};
pub use model::{RecipeModel, RecipeTime};
pub use property_mapper::PropertyMapper;
pub use scrapers::{scrape_document, scrape_html, JsonLdScraper, MicrodataScraper};
pub use sink::{RecipeSink, TracingSink};
pub use types::{ExtractionAttempt, ExtractionMethod, FinalRecipe, RecipeItem, ScrapeOutput};
