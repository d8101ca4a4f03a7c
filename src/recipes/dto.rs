use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ingredients::dto::IngredientResponse;
use crate::tags::dto::TagResponse;

/// Request body for creating or fully replacing a recipe.
#[derive(Debug, Deserialize)]
pub struct RecipePayload {
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub ingredient_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RecipeListItem {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub image_key: Option<String>,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct RecipeImageResponse {
    pub id: Uuid,
    pub image_key: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn recipe_payload_accepts_numeric_and_string_price() {
        let from_number: RecipePayload = serde_json::from_str(
            r#"{"title": "Dal", "time_minutes": 30, "price": 4.75}"#,
        )
        .unwrap();
        assert_eq!(from_number.price, Decimal::new(475, 2));
        assert!(from_number.tag_ids.is_empty());

        let from_string: RecipePayload = serde_json::from_str(
            r#"{"title": "Dal", "time_minutes": 30, "price": "4.75"}"#,
        )
        .unwrap();
        assert_eq!(from_string.price, from_number.price);
    }
}
