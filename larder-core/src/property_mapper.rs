//! Field-mapping table used to turn a raw recipe item into the final model.
//!
//! A [`PropertyMapper`] is an ordered table of `field name -> fn(raw) -> value`.
//! Only fields present in the table survive the transform, so the table doubles
//! as the whitelist for the final model.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Conversion applied to one raw field value.
pub type FieldFn = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Ordered mapping table from field name to conversion function.
pub struct PropertyMapper {
    fields: Vec<(String, FieldFn)>,
}

impl PropertyMapper {
    /// Create an empty table. Maps nothing.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field, replacing any earlier entry with the same name.
    pub fn with_field<F>(mut self, name: impl Into<String>, map: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        let map: FieldFn = Box::new(map);
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = map,
            None => self.fields.push((name, map)),
        }
        self
    }

    /// Field names in table order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(existing, _)| existing == name)
    }

    /// Apply the conversion for `name`, or `None` if the field is not mapped.
    pub fn map_field(&self, name: &str, raw: &Value) -> Option<Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, map)| map(raw))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &FieldFn)> {
        self.fields.iter().map(|(name, map)| (name.as_str(), map))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Table for schema.org Recipe properties.
    pub fn standard() -> Self {
        Self::new()
            .with_field("name", map_text)
            .with_field("description", map_text)
            .with_field("author", map_author)
            .with_field("image", map_image)
            .with_field("recipeYield", map_yield)
            .with_field("prepTime", map_duration)
            .with_field("cookTime", map_duration)
            .with_field("totalTime", map_duration)
            .with_field("recipeIngredient", map_ingredients)
            .with_field("recipeInstructions", map_instructions)
            .with_field("recipeCategory", map_list)
            .with_field("recipeCuisine", map_list)
            .with_field("keywords", map_list)
    }
}

impl Default for PropertyMapper {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for PropertyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMapper")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Regex to strip HTML tags that some sites leave inside JSON-LD strings.
static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// ISO 8601 duration as used by schema.org (e.g. "PT1H30M", "P0DT0H45M").
static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.\d+)?S)?)?$")
        .expect("Invalid duration regex")
});

/// Strip tags, decode the common entities and collapse whitespace.
fn clean_text(s: &str) -> String {
    let stripped = HTML_TAG_REGEX.replace_all(s, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    WHITESPACE_REGEX.replace_all(&decoded, " ").trim().to_string()
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => n.to_string(),
        Value::Array(arr) => return arr.iter().find_map(text_of),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn string_or_null(s: Option<String>) -> Value {
    s.map(Value::String).unwrap_or(Value::Null)
}

fn strings(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}

pub fn map_text(value: &Value) -> Value {
    string_or_null(text_of(value))
}

/// Author may be a plain name, a Person/Organization object, or a list of either.
pub fn map_author(value: &Value) -> Value {
    fn name_of(value: &Value) -> Option<String> {
        match value {
            Value::Object(obj) => obj.get("name").and_then(text_of),
            other => text_of(other),
        }
    }

    match value {
        Value::Array(arr) => {
            let names: Vec<String> = arr.iter().filter_map(name_of).collect();
            string_or_null((!names.is_empty()).then(|| names.join(", ")))
        }
        other => string_or_null(name_of(other)),
    }
}

/// Image may be a URL, an ImageObject, or a list of either.
pub fn map_image(value: &Value) -> Value {
    let mut urls = Vec::new();

    match value {
        Value::String(s) => {
            urls.push(s.trim().to_string());
        }
        Value::Array(arr) => {
            for item in arr {
                if let Some(s) = item.as_str() {
                    urls.push(s.trim().to_string());
                } else if let Some(url) = item.get("url").and_then(|v| v.as_str()) {
                    urls.push(url.trim().to_string());
                }
            }
        }
        Value::Object(obj) => {
            if let Some(url) = obj.get("url").and_then(|v| v.as_str()) {
                urls.push(url.trim().to_string());
            }
        }
        _ => {}
    }

    urls.retain(|u| !u.is_empty());
    urls.dedup();
    strings(urls)
}

pub fn map_yield(value: &Value) -> Value {
    match value {
        Value::Array(arr) => string_or_null(arr.first().and_then(text_of)),
        other => map_text(other),
    }
}

/// ISO 8601 duration to whole minutes. Unparseable text is kept as-is.
pub fn map_duration(value: &Value) -> Value {
    let Some(text) = text_of(value) else {
        return Value::Null;
    };
    match parse_duration_minutes(&text) {
        Some(minutes) => Value::from(minutes),
        None => Value::String(text),
    }
}

pub fn parse_duration_minutes(s: &str) -> Option<u64> {
    let caps = DURATION_REGEX.captures(s.trim())?;
    let part = |i: usize| -> Option<u64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    // "P" and "PT" alone match the regex but carry no duration
    if (1..=4).all(|i| caps.get(i).is_none()) {
        return None;
    }
    // Oversized components fall back to the text
    part(1)?
        .checked_mul(24 * 60)?
        .checked_add(part(2)?.checked_mul(60)?)?
        .checked_add(part(3)?)?
        .checked_add(part(4)? / 60)
}

pub fn map_ingredients(value: &Value) -> Value {
    let ingredients: Vec<String> = match value {
        Value::Array(arr) => arr.iter().filter_map(text_of).collect(),
        Value::String(s) => s.lines().map(clean_text).filter(|s| !s.is_empty()).collect(),
        _ => Vec::new(),
    };
    strings(ingredients)
}

/// Instructions may be a blob, a list of strings, HowToStep objects, or
/// HowToSection objects wrapping steps. Sections are flattened.
pub fn map_instructions(value: &Value) -> Value {
    fn collect_steps(value: &Value, steps: &mut Vec<String>) {
        match value {
            Value::String(s) => {
                steps.extend(s.lines().map(clean_text).filter(|s| !s.is_empty()));
            }
            Value::Array(arr) => {
                for item in arr {
                    collect_steps(item, steps);
                }
            }
            Value::Object(obj) => {
                if let Some(items) = obj.get("itemListElement") {
                    collect_steps(items, steps);
                } else if let Some(text) = obj.get("text").and_then(text_of) {
                    steps.push(text);
                } else if let Some(name) = obj.get("name").and_then(text_of) {
                    steps.push(name);
                }
            }
            _ => {}
        }
    }

    let mut steps = Vec::new();
    collect_steps(value, &mut steps);
    strings(steps)
}

/// Comma-separated text or a list of values.
pub fn map_list(value: &Value) -> Value {
    let items: Vec<String> = match value {
        Value::String(s) => s
            .split(',')
            .map(clean_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::Array(arr) => arr.iter().filter_map(text_of).collect(),
        _ => Vec::new(),
    };
    strings(items)
}
