//! Bundled generic scrapers and the chain that tries them in order.

mod json_ld;
mod microdata;

pub use json_ld::JsonLdScraper;
pub use microdata::MicrodataScraper;

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::base::{Scraper, SiteScraper};
use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::model::RecipeModel;
use crate::property_mapper::PropertyMapper;
use crate::sink::RecipeSink;
use crate::types::{ExtractionAttempt, ExtractionMethod, FinalRecipe, RecipeItem, ScrapeOutput};

static OG_IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("Invalid selector"));

/// Image URL from the og:image meta tag, for recipes whose structured data omits one.
pub(crate) fn og_image(document: &Html) -> Option<String> {
    document
        .select(&OG_IMAGE_SELECTOR)
        .next()?
        .value()
        .attr("content")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse `html` and run the configured scrapers over it.
pub fn scrape_html(
    html: &str,
    config: &ScrapeConfig,
    mapper: &PropertyMapper,
    sink: Option<&dyn RecipeSink>,
) -> Result<ScrapeOutput, ScrapeError> {
    let document = Html::parse_document(html);
    scrape_document(&document, &config.scrapers, mapper, sink)
}

/// Try each scraper in order and return the first recipe found, along with
/// the outcome of every scraper tried. The winning scraper prints its records
/// to `sink`, if one is given.
///
/// When all fail, the error from the scraper that got furthest is returned:
/// the first one that found metadata, otherwise the last one tried.
pub fn scrape_document(
    document: &Html,
    methods: &[ExtractionMethod],
    mapper: &PropertyMapper,
    sink: Option<&dyn RecipeSink>,
) -> Result<ScrapeOutput, ScrapeError> {
    let mut all_attempts = Vec::with_capacity(methods.len());
    let mut best_error: Option<ScrapeError> = None;

    for &method in methods {
        let result = match method {
            ExtractionMethod::JsonLd => run_scraper(JsonLdScraper, document, mapper, sink),
            ExtractionMethod::Microdata => run_scraper(MicrodataScraper, document, mapper, sink),
        };

        match result {
            Ok((recipe_item, final_recipe)) => {
                all_attempts.push(ExtractionAttempt {
                    method,
                    success: true,
                    error: None,
                });
                tracing::debug!(method = %method, "Recipe found");
                let recipe = RecipeModel::from_final(&final_recipe);
                return Ok(ScrapeOutput {
                    recipe_item,
                    final_recipe,
                    recipe,
                    method_used: method,
                    all_attempts,
                });
            }
            Err(e) => {
                tracing::debug!(method = %method, "Scraper failed: {}", e);
                all_attempts.push(ExtractionAttempt {
                    method,
                    success: false,
                    error: Some(e.to_string()),
                });
                if matches!(best_error, None | Some(ScrapeError::MissingMetadata { .. })) {
                    best_error = Some(e);
                }
            }
        }
    }

    Err(best_error.unwrap_or(ScrapeError::MissingMetadata { scraper_type: None }))
}

fn run_scraper<S>(
    site: S,
    document: &Html,
    mapper: &PropertyMapper,
    sink: Option<&dyn RecipeSink>,
) -> Result<(RecipeItem, FinalRecipe), ScrapeError>
where
    S: SiteScraper<Document = Html>,
{
    let mut scraper = Scraper::new(site, document, mapper);
    scraper.get_recipe()?;
    if let Some(sink) = sink {
        scraper.print(sink);
    }
    let (item, final_recipe) = scraper.into_records();
    Ok((item.unwrap_or_default(), final_recipe.unwrap_or_default()))
}
