use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::og_image;
use crate::base::SiteScraper;
use crate::types::RecipeItem;

static RECIPE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[itemtype="http://schema.org/Recipe"], [itemtype="https://schema.org/Recipe"]"#,
    )
    .expect("Invalid selector")
});

static INGREDIENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[itemprop="recipeIngredient"], [itemprop="ingredients"]"#)
        .expect("Invalid selector")
});

static STEP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"[itemprop="recipeInstructions"], [itemprop="instructions"], [itemtype*="HowToStep"]"#,
    )
    .expect("Invalid selector")
});

static STEP_TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="text"]"#).expect("Invalid selector"));

static IMAGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="image"]"#).expect("Invalid selector"));

/// Single-valued properties copied into the item as text.
const TEXT_PROPS: &[&str] = &[
    "name",
    "description",
    "author",
    "recipeYield",
    "prepTime",
    "cookTime",
    "totalTime",
    "recipeCategory",
    "recipeCuisine",
    "keywords",
];

/// Reads schema.org Recipe microdata (`itemtype` / `itemprop` attributes).
///
/// The probe yields the Recipe container's `itemtype` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrodataScraper;

impl MicrodataScraper {
    pub const NAME: &'static str = "microdata";
}

impl SiteScraper for MicrodataScraper {
    type Document = Html;
    type Meta = String;

    fn scraper_type(&self) -> Option<&str> {
        Some(Self::NAME)
    }

    fn test_for_metadata(&self, document: &Html) -> Option<String> {
        document
            .select(&RECIPE_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("itemtype"))
            .map(str::to_string)
    }

    fn find_recipe_item(&self, document: &Html, _itemtype: &String) -> Option<RecipeItem> {
        let recipe = document.select(&RECIPE_SELECTOR).next()?;
        let mut item = RecipeItem::new();

        for prop in TEXT_PROPS {
            if let Some(text) = microdata_text(&recipe, prop) {
                item.insert(prop.to_string(), Value::String(text));
            }
        }

        let ingredients = texts(recipe.select(&INGREDIENT_SELECTOR));
        if !ingredients.is_empty() {
            item.insert("recipeIngredient".to_string(), strings(ingredients));
        }

        let steps = microdata_steps(&recipe);
        if !steps.is_empty() {
            item.insert("recipeInstructions".to_string(), strings(steps));
        }

        let mut images = microdata_images(&recipe);
        if images.is_empty() {
            images.extend(og_image(document));
        }
        if !images.is_empty() {
            item.insert("image".to_string(), strings(images));
        }

        // A container with neither a name nor ingredients is page chrome, not a recipe
        if !item.contains_key("name") && !item.contains_key("recipeIngredient") {
            return None;
        }
        Some(item)
    }
}

fn strings(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

fn element_text(el: &ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn texts<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .map(|el| element_text(&el))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Value of the first element carrying `itemprop`, preferring machine-readable
/// `content` / `datetime` attributes over visible text.
fn microdata_text(element: &ElementRef, prop: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"[itemprop="{}"]"#, prop)).ok()?;
    let el = element.select(&selector).next()?;
    let value = el
        .value()
        .attr("content")
        .or_else(|| el.value().attr("datetime"))
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| element_text(&el));
    (!value.is_empty()).then_some(value)
}

fn microdata_steps(recipe: &ElementRef) -> Vec<String> {
    recipe
        .select(&STEP_SELECTOR)
        .filter(|el| {
            // A HowToStep nested in a recipeInstructions block is visited on its own
            !el.select(&STEP_SELECTOR).any(|inner| inner.id() != el.id())
        })
        .map(|el| match el.select(&STEP_TEXT_SELECTOR).next() {
            Some(text_el) => element_text(&text_el),
            None => element_text(&el),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn microdata_images(recipe: &ElementRef) -> Vec<String> {
    recipe
        .select(&IMAGE_SELECTOR)
        .filter_map(|el| {
            let attrs = el.value();
            attrs
                .attr("src")
                .or_else(|| attrs.attr("href"))
                .or_else(|| attrs.attr("content"))
                .map(str::to_string)
        })
        .collect()
}
