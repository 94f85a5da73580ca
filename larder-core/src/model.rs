//! Typed view of a final recipe.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::FinalRecipe;

/// Preparation or cooking time. Minutes when the source gave an ISO 8601
/// duration, otherwise the text as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeTime {
    Minutes(u64),
    Text(String),
}

/// Recipe in its final shape. Missing fields are empty rather than absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeModel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_yield: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<RecipeTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<RecipeTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<RecipeTime>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub categories: Vec<String>,
    pub cuisines: Vec<String>,
    pub keywords: Vec<String>,
}

impl RecipeModel {
    /// Build from a final recipe. Fields of an unexpected shape are left empty.
    pub fn from_final(recipe: &FinalRecipe) -> Self {
        let text = |key: &str| recipe.get(key).and_then(Value::as_str).map(str::to_string);
        let list = |key: &str| -> Vec<String> {
            recipe
                .get(key)
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        let time = |key: &str| -> Option<RecipeTime> {
            match recipe.get(key)? {
                Value::Number(n) => n.as_u64().map(RecipeTime::Minutes),
                Value::String(s) => Some(RecipeTime::Text(s.clone())),
                _ => None,
            }
        };

        Self {
            name: text("name").unwrap_or_default(),
            description: text("description"),
            author: text("author"),
            images: list("image"),
            recipe_yield: text("recipeYield"),
            prep_time: time("prepTime"),
            cook_time: time("cookTime"),
            total_time: time("totalTime"),
            ingredients: list("recipeIngredient"),
            instructions: list("recipeInstructions"),
            categories: list("recipeCategory"),
            cuisines: list("recipeCuisine"),
            keywords: list("keywords"),
        }
    }
}
