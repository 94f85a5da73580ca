use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use super::og_image;
use crate::base::SiteScraper;
use crate::types::RecipeItem;

static JSONLD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("Invalid selector")
});

/// Reads schema.org Recipe data from `application/ld+json` script tags.
///
/// The probe yields every script block that parses as JSON; extraction picks
/// the first Recipe object among them.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdScraper;

impl JsonLdScraper {
    pub const NAME: &'static str = "json_ld";
}

impl SiteScraper for JsonLdScraper {
    type Document = Html;
    type Meta = Vec<Value>;

    fn scraper_type(&self) -> Option<&str> {
        Some(Self::NAME)
    }

    fn test_for_metadata(&self, document: &Html) -> Option<Vec<Value>> {
        let blocks: Vec<Value> = document
            .select(&JSONLD_SELECTOR)
            .filter_map(|element| {
                let sanitized = sanitize_json(&element.inner_html());
                match serde_json::from_str(&sanitized) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::debug!("Skipping unparseable JSON-LD block: {}", e);
                        None
                    }
                }
            })
            .collect();

        (!blocks.is_empty()).then_some(blocks)
    }

    fn find_recipe_item(&self, document: &Html, blocks: &Vec<Value>) -> Option<RecipeItem> {
        let mut item = blocks
            .iter()
            .find_map(find_recipe_in_json)
            .and_then(|recipe| recipe.as_object().cloned())?;

        // Some sites leave the image out of the Recipe object
        if !item.contains_key("image") {
            if let Some(image) = og_image(document) {
                item.insert("image".to_string(), Value::String(image));
            }
        }
        Some(item)
    }
}

/// Escape raw control characters that some sites leave inside JSON strings.
pub(crate) fn sanitize_json(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
                result.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    result.push(c);
                }
                '"' => {
                    in_string = false;
                    result.push(c);
                }
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                c if c.is_control() => {}
                _ => result.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
    }

    result
}

fn is_recipe_type(value: &Value) -> bool {
    fn matches(s: &str) -> bool {
        s == "Recipe" || s.ends_with("schema.org/Recipe") || s == "schema:Recipe"
    }
    match value {
        Value::String(s) => matches(s),
        Value::Array(arr) => arr.iter().filter_map(|v| v.as_str()).any(matches),
        _ => false,
    }
}

/// Depth-first search for a Recipe object, through `@graph` and nested values.
pub(crate) fn find_recipe_in_json(json: &Value) -> Option<&Value> {
    match json {
        Value::Object(obj) => {
            if obj.get("@type").is_some_and(is_recipe_type) {
                return Some(json);
            }

            if let Some(recipe) = obj.get("@graph").and_then(find_recipe_in_json) {
                return Some(recipe);
            }

            obj.iter()
                .filter(|(key, _)| key.as_str() != "@graph")
                .find_map(|(_, value)| find_recipe_in_json(value))
        }
        Value::Array(arr) => arr.iter().find_map(find_recipe_in_json),
        _ => None,
    }
}
