//! The scraper contract and its two-phase orchestration.
//!
//! A site scraper supplies two hooks through [`SiteScraper`]: a metadata probe
//! and an item extraction step. [`Scraper`] runs them in order, refuses to go
//! further when either comes back empty, and maps the raw item through a
//! [`PropertyMapper`] into the final model.

use tracing::{debug, info_span};

use crate::error::ScrapeError;
use crate::property_mapper::PropertyMapper;
use crate::sink::RecipeSink;
use crate::types::{FinalRecipe, RecipeItem};

/// Hooks implemented by each site scraper.
pub trait SiteScraper {
    /// Parsed document the hooks traverse.
    type Document: ?Sized;
    /// Whatever the probe found that tells the extractor where the recipe lives.
    type Meta;

    /// Site identifier reported in orchestration errors.
    fn scraper_type(&self) -> Option<&str> {
        None
    }

    /// Look for recipe metadata in the document.
    fn test_for_metadata(&self, document: &Self::Document) -> Option<Self::Meta>;

    /// Locate the raw recipe record, given the metadata the probe found.
    fn find_recipe_item(&self, document: &Self::Document, meta: &Self::Meta)
        -> Option<RecipeItem>;
}

/// One extraction attempt over one document.
///
/// State is not reset between calls; build a new `Scraper` per document.
pub struct Scraper<'a, S: SiteScraper> {
    site: S,
    document: &'a S::Document,
    mapper: &'a PropertyMapper,
    meta: Option<S::Meta>,
    recipe_item: Option<RecipeItem>,
    final_recipe: Option<FinalRecipe>,
}

impl<'a, S: SiteScraper> Scraper<'a, S> {
    pub fn new(site: S, document: &'a S::Document, mapper: &'a PropertyMapper) -> Self {
        Self {
            site,
            document,
            mapper,
            meta: None,
            recipe_item: None,
            final_recipe: None,
        }
    }

    /// Run the probe, then extraction, then the mapping step.
    ///
    /// Stops at the first step that finds nothing; later steps do not run.
    pub fn get_recipe(&mut self) -> Result<&FinalRecipe, ScrapeError> {
        let _span = info_span!(
            "get_recipe",
            scraper = self.site.scraper_type().unwrap_or("unnamed")
        )
        .entered();

        self.meta = self.site.test_for_metadata(self.document);
        let Some(meta) = self.meta.as_ref() else {
            debug!("No metadata found");
            return Err(ScrapeError::MissingMetadata {
                scraper_type: self.scraper_type_owned(),
            });
        };

        self.recipe_item = self.site.find_recipe_item(self.document, meta);
        let Some(item) = self.recipe_item.as_ref() else {
            debug!("Metadata found but no recipe item");
            return Err(ScrapeError::MissingRecipeItem {
                scraper_type: self.scraper_type_owned(),
            });
        };

        let final_recipe = map_recipe_item(self.mapper, item);
        debug!(fields = final_recipe.len(), "Mapped recipe item");
        Ok(self.final_recipe.insert(final_recipe))
    }

    /// Rebuild `final_recipe` from the current `recipe_item`.
    ///
    /// Does nothing when no recipe item has been set.
    pub fn transform_to_final_model(&mut self) {
        let Some(item) = self.recipe_item.as_ref() else {
            debug!("No recipe item to transform");
            return;
        };
        self.final_recipe = Some(map_recipe_item(self.mapper, item));
    }

    /// Emit `recipe_item` and then `final_recipe` to the sink, skipping unset ones.
    pub fn print(&self, sink: &dyn RecipeSink) {
        if let Some(item) = &self.recipe_item {
            sink.emit(item);
        }
        if let Some(final_recipe) = &self.final_recipe {
            sink.emit(final_recipe);
        }
    }

    /// Replace the raw record, e.g. with one extracted elsewhere.
    pub fn set_recipe_item(&mut self, item: RecipeItem) {
        self.recipe_item = Some(item);
    }

    pub fn site(&self) -> &S {
        &self.site
    }

    pub fn scraper_type(&self) -> Option<&str> {
        self.site.scraper_type()
    }

    pub fn document(&self) -> &'a S::Document {
        self.document
    }

    pub fn meta(&self) -> Option<&S::Meta> {
        self.meta.as_ref()
    }

    pub fn recipe_item(&self) -> Option<&RecipeItem> {
        self.recipe_item.as_ref()
    }

    pub fn final_recipe(&self) -> Option<&FinalRecipe> {
        self.final_recipe.as_ref()
    }

    /// Consume the scraper, keeping the raw and final records.
    pub fn into_records(self) -> (Option<RecipeItem>, Option<FinalRecipe>) {
        (self.recipe_item, self.final_recipe)
    }

    fn scraper_type_owned(&self) -> Option<String> {
        self.site.scraper_type().map(str::to_string)
    }
}

/// Keep only fields the mapper knows, converting each through its table entry.
pub fn map_recipe_item(mapper: &PropertyMapper, item: &RecipeItem) -> FinalRecipe {
    let mut final_recipe = FinalRecipe::new();
    for (field, map) in mapper.iter() {
        if let Some(raw) = item.get(field) {
            final_recipe.insert(field.to_string(), map(raw));
        }
    }

    let dropped = item.keys().filter(|k| !mapper.contains(k)).count();
    if dropped > 0 {
        debug!(dropped, "Dropped unmapped fields");
    }
    final_recipe
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;

    /// Stand-in site scraper with canned hook results.
    #[derive(Default)]
    struct StubScraper {
        scraper_type: Option<&'static str>,
        meta: Option<&'static str>,
        item: Option<Value>,
        probe_calls: Cell<usize>,
        extract_calls: Cell<usize>,
    }

    impl SiteScraper for StubScraper {
        type Document = str;
        type Meta = String;

        fn scraper_type(&self) -> Option<&str> {
            self.scraper_type
        }

        fn test_for_metadata(&self, _document: &str) -> Option<String> {
            self.probe_calls.set(self.probe_calls.get() + 1);
            self.meta.map(str::to_string)
        }

        fn find_recipe_item(&self, _document: &str, _meta: &String) -> Option<RecipeItem> {
            self.extract_calls.set(self.extract_calls.get() + 1);
            self.item.as_ref().and_then(|v| v.as_object().cloned())
        }
    }

    fn item(value: Value) -> RecipeItem {
        value.as_object().cloned().unwrap()
    }

    /// Mapper whose entries append a suffix, plus a shared call counter.
    fn counting_mapper(fields: &[&'static str]) -> (PropertyMapper, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mapper = PropertyMapper::new();
        for &field in fields {
            let calls = Arc::clone(&calls);
            mapper = mapper.with_field(field, move |v| {
                calls.fetch_add(1, Ordering::SeqCst);
                json!(format!("{} my-{}", v.as_str().unwrap_or_default(), field))
            });
        }
        (mapper, calls)
    }

    const DOCUMENT: &str = "<html></html>";

    #[test]
    fn test_new_scraper_has_empty_state() {
        let mapper = PropertyMapper::new();
        let scraper = Scraper::new(StubScraper::default(), DOCUMENT, &mapper);

        assert!(std::ptr::eq(scraper.document(), DOCUMENT));
        assert!(scraper.meta().is_none());
        assert!(scraper.recipe_item().is_none());
        assert!(scraper.final_recipe().is_none());
    }

    #[test]
    fn test_get_recipe_sets_meta_and_item() {
        let (mapper, calls) = counting_mapper(&["hi"]);
        let site = StubScraper {
            meta: Some("something"),
            item: Some(json!({ "hi": "food n stuff" })),
            ..Default::default()
        };
        let mut scraper = Scraper::new(site, DOCUMENT, &mapper);

        let final_recipe = scraper.get_recipe().unwrap();
        assert_eq!(final_recipe, &item(json!({ "hi": "food n stuff my-hi" })));

        assert_eq!(scraper.meta(), Some(&"something".to_string()));
        assert_eq!(
            scraper.recipe_item(),
            Some(&item(json!({ "hi": "food n stuff" })))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(scraper.site().probe_calls.get(), 1);
        assert_eq!(scraper.site().extract_calls.get(), 1);
    }

    #[test]
    fn test_transform_keeps_only_mapped_fields() {
        let (mapper, _) = counting_mapper(&["name", "photo"]);
        let mut scraper = Scraper::new(StubScraper::default(), DOCUMENT, &mapper);
        scraper.set_recipe_item(item(json!({
            "name": "eat my food",
            "photo": "take my pic",
            "forget": "me,"
        })));

        scraper.transform_to_final_model();

        assert_eq!(
            scraper.final_recipe(),
            Some(&item(json!({
                "name": "eat my food my-name",
                "photo": "take my pic my-photo"
            })))
        );
    }

    #[test]
    fn test_transform_without_item_is_noop() {
        let (mapper, calls) = counting_mapper(&["name"]);
        let mut scraper = Scraper::new(StubScraper::default(), DOCUMENT, &mapper);

        scraper.transform_to_final_model();

        assert!(scraper.final_recipe().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_meta_stops_before_extraction() {
        let (mapper, calls) = counting_mapper(&["hi"]);
        let site = StubScraper {
            scraper_type: Some("tester"),
            meta: None,
            item: Some(json!({ "hi": "food n stuff" })),
            ..Default::default()
        };
        let mut scraper = Scraper::new(site, DOCUMENT, &mapper);

        let err = scraper.get_recipe().unwrap_err();

        assert_eq!(
            serde_json::to_value(err.payload()).unwrap(),
            json!({ "message": "no meta data was found", "type": "tester" })
        );
        assert!(scraper.meta().is_none());
        assert!(scraper.recipe_item().is_none());
        assert!(scraper.final_recipe().is_none());
        assert_eq!(scraper.site().extract_calls.get(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_item_stops_before_mapping() {
        let (mapper, calls) = counting_mapper(&["hi"]);
        let site = StubScraper {
            scraper_type: Some("tester-2"),
            meta: Some("something-meta"),
            item: None,
            ..Default::default()
        };
        let mut scraper = Scraper::new(site, DOCUMENT, &mapper);

        let err = scraper.get_recipe().unwrap_err();

        assert_eq!(
            err,
            ScrapeError::MissingRecipeItem {
                scraper_type: Some("tester-2".to_string())
            }
        );
        assert_eq!(
            serde_json::to_value(err.payload()).unwrap(),
            json!({ "message": "found metadata, but no recipe information", "type": "tester-2" })
        );
        assert_eq!(scraper.meta(), Some(&"something-meta".to_string()));
        assert!(scraper.recipe_item().is_none());
        assert!(scraper.final_recipe().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_print_emits_each_set_record() {
        let (mapper, _) = counting_mapper(&["name"]);
        let mut scraper = Scraper::new(StubScraper::default(), DOCUMENT, &mapper);
        scraper.set_recipe_item(item(json!({ "name": "eat my food", "forget": "me," })));
        scraper.transform_to_final_model();

        let emitted = RefCell::new(Vec::new());
        let sink = |record: &RecipeItem| emitted.borrow_mut().push(record.clone());
        scraper.print(&sink);

        assert_eq!(
            emitted.into_inner(),
            vec![
                item(json!({ "name": "eat my food", "forget": "me," })),
                item(json!({ "name": "eat my food my-name" })),
            ]
        );
    }

    #[test]
    fn test_print_with_only_item_emits_once() {
        let mapper = PropertyMapper::new();
        let mut scraper = Scraper::new(StubScraper::default(), DOCUMENT, &mapper);
        scraper.set_recipe_item(item(json!({ "name": "eat my food" })));

        let count = Cell::new(0);
        let sink = |_: &RecipeItem| count.set(count.get() + 1);
        scraper.print(&sink);

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_print_with_nothing_set_never_emits() {
        let mapper = PropertyMapper::new();
        let scraper = Scraper::new(StubScraper::default(), DOCUMENT, &mapper);

        let count = Cell::new(0);
        let sink = |_: &RecipeItem| count.set(count.get() + 1);
        scraper.print(&sink);

        assert_eq!(count.get(), 0);
    }
}
