use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    ingredients::{
        dto::{IngredientPayload, IngredientResponse},
        repo_types::Ingredient,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/:id",
            put(update_ingredient).delete(delete_ingredient),
        )
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<IngredientResponse>>, (StatusCode, String)> {
    let ingredients = Ingredient::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<IngredientPayload>,
) -> Result<(StatusCode, Json<IngredientResponse>), (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name is required".into()));
    }
    let ingredient = Ingredient::create(&state.db, user_id, payload.name.trim())
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngredientPayload>,
) -> Result<Json<IngredientResponse>, (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name is required".into()));
    }
    let ingredient = Ingredient::rename(&state.db, user_id, id, payload.name.trim())
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Ingredient not found".to_string()))?;
    Ok(Json(ingredient.into()))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = Ingredient::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Ingredient not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
