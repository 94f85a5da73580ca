//! Site scrapers assembled from closures at runtime.
//!
//! Statically defined scrapers get both hooks checked by the compiler. Scrapers
//! registered at runtime (from config, plugins, tests) go through
//! [`DynamicScraperBuilder`], which enforces the same contract when built.

use std::fmt;

use crate::base::SiteScraper;
use crate::error::{Hook, ScrapeError};
use crate::types::RecipeItem;

type ProbeFn<D, M> = Box<dyn Fn(&D) -> Option<M>>;
type ExtractFn<D, M> = Box<dyn Fn(&D, &M) -> Option<RecipeItem>>;

/// A [`SiteScraper`] whose hooks are boxed closures.
pub struct DynamicScraper<D: ?Sized, M> {
    scraper_type: Option<String>,
    probe: ProbeFn<D, M>,
    extract: ExtractFn<D, M>,
}

impl<D: ?Sized, M> DynamicScraper<D, M> {
    pub fn builder() -> DynamicScraperBuilder<D, M> {
        DynamicScraperBuilder::default()
    }
}

impl<D: ?Sized, M> SiteScraper for DynamicScraper<D, M> {
    type Document = D;
    type Meta = M;

    fn scraper_type(&self) -> Option<&str> {
        self.scraper_type.as_deref()
    }

    fn test_for_metadata(&self, document: &D) -> Option<M> {
        (self.probe)(document)
    }

    fn find_recipe_item(&self, document: &D, meta: &M) -> Option<RecipeItem> {
        (self.extract)(document, meta)
    }
}

impl<D: ?Sized, M> fmt::Debug for DynamicScraper<D, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicScraper")
            .field("scraper_type", &self.scraper_type)
            .finish_non_exhaustive()
    }
}

pub struct DynamicScraperBuilder<D: ?Sized, M> {
    scraper_type: Option<String>,
    probe: Option<ProbeFn<D, M>>,
    extract: Option<ExtractFn<D, M>>,
}

impl<D: ?Sized, M> Default for DynamicScraperBuilder<D, M> {
    fn default() -> Self {
        Self {
            scraper_type: None,
            probe: None,
            extract: None,
        }
    }
}

impl<D: ?Sized, M> DynamicScraperBuilder<D, M> {
    /// Site identifier reported in orchestration errors.
    pub fn scraper_type(mut self, scraper_type: impl Into<String>) -> Self {
        self.scraper_type = Some(scraper_type.into());
        self
    }

    pub fn test_for_metadata<F>(mut self, probe: F) -> Self
    where
        F: Fn(&D) -> Option<M> + 'static,
    {
        self.probe = Some(Box::new(probe));
        self
    }

    pub fn find_recipe_item<F>(mut self, extract: F) -> Self
    where
        F: Fn(&D, &M) -> Option<RecipeItem> + 'static,
    {
        self.extract = Some(Box::new(extract));
        self
    }

    /// Fails with [`ScrapeError::ContractViolation`] naming the first missing
    /// hook, probe before extraction.
    pub fn build(self) -> Result<DynamicScraper<D, M>, ScrapeError> {
        let probe = self.probe.ok_or(ScrapeError::ContractViolation {
            hook: Hook::TestForMetadata,
        })?;
        let extract = self.extract.ok_or(ScrapeError::ContractViolation {
            hook: Hook::FindRecipeItem,
        })?;

        Ok(DynamicScraper {
            scraper_type: self.scraper_type,
            probe,
            extract,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::base::Scraper;
    use crate::property_mapper::PropertyMapper;

    type TestBuilder = DynamicScraperBuilder<str, String>;

    fn hi_item() -> RecipeItem {
        json!({ "hi": "food n stuff" }).as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_probe_is_reported_first() {
        let err = TestBuilder::default().build().unwrap_err();
        assert_eq!(
            err,
            ScrapeError::ContractViolation {
                hook: Hook::TestForMetadata
            }
        );

        let err = TestBuilder::default()
            .find_recipe_item(|_, _| None)
            .build()
            .unwrap_err();
        assert_eq!(
            serde_json::to_value(err.payload()).unwrap(),
            json!({ "message": "testForMetadata function must be implemented by child class" })
        );
    }

    #[test]
    fn test_missing_extraction_is_reported() {
        let err = TestBuilder::default()
            .test_for_metadata(|_| None)
            .build()
            .unwrap_err();
        assert_eq!(
            serde_json::to_value(err.payload()).unwrap(),
            json!({ "message": "findRecipeItem function must be implemented by child class" })
        );
    }

    #[test]
    fn test_built_scraper_runs_hooks() {
        let site = DynamicScraper::<str, String>::builder()
            .test_for_metadata(|_| Some("something".to_string()))
            .find_recipe_item(|_, _| Some(hi_item()))
            .build()
            .unwrap();
        let mapper = PropertyMapper::new().with_field("hi", |v| v.clone());
        let mut scraper = Scraper::new(site, "<html></html>", &mapper);

        scraper.get_recipe().unwrap();

        assert_eq!(scraper.meta(), Some(&"something".to_string()));
        assert_eq!(scraper.recipe_item(), Some(&hi_item()));
        assert_eq!(scraper.final_recipe(), Some(&hi_item()));
    }

    #[test]
    fn test_declared_type_reaches_error() {
        let extract_calls = Rc::new(Cell::new(0));
        let calls = Rc::clone(&extract_calls);
        let site = DynamicScraper::<str, String>::builder()
            .scraper_type("tester")
            .test_for_metadata(|_| None)
            .find_recipe_item(move |_, _| {
                calls.set(calls.get() + 1);
                Some(hi_item())
            })
            .build()
            .unwrap();
        let mapper = PropertyMapper::standard();
        let mut scraper = Scraper::new(site, "", &mapper);

        let err = scraper.get_recipe().unwrap_err();

        assert_eq!(
            serde_json::to_value(err.payload()).unwrap(),
            json!({ "message": "no meta data was found", "type": "tester" })
        );
        assert_eq!(extract_calls.get(), 0);
        assert!(scraper.recipe_item().is_none());
    }
}
