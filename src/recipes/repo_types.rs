use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Recipe record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub image_key: Option<String>, // object-storage key of the attached image
    pub created_at: OffsetDateTime,
}

/// Column values for an insert or full update, without the generated fields.
#[derive(Debug)]
pub struct NewRecipe<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<&'a str>,
}
