use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingredients::repo_types::Ingredient;

#[derive(Debug, Deserialize)]
pub struct IngredientPayload {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
        }
    }
}
