use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    recipes::{
        dto::{Pagination, RecipeDetails, RecipeImageResponse, RecipeListItem, RecipePayload},
        repo_types::Recipe,
        services,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/image", get(get_image).post(upload_image))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB uploads
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn validate(payload: &RecipePayload) -> Result<(), (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title is required".into()));
    }
    if payload.time_minutes < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "time_minutes must not be negative".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<RecipeListItem>>, (StatusCode, String)> {
    let recipes = Recipe::list_by_user(&state.db, user_id, p.limit, p.offset)
        .await
        .map_err(internal)?;
    let items = recipes
        .into_iter()
        .map(|r| RecipeListItem {
            id: r.id,
            title: r.title,
            time_minutes: r.time_minutes,
            price: r.price,
            created_at: r.created_at,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    let recipe = Recipe::get(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;
    let details = services::recipe_details(&state.db, recipe)
        .await
        .map_err(internal)?;
    Ok(Json(details))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RecipePayload>,
) -> Result<(StatusCode, HeaderMap, Json<RecipeDetails>), (StatusCode, String)> {
    validate(&payload)?;

    let recipe = services::create_recipe(&state.db, user_id, &payload)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "create_recipe failed");
            internal(e)
        })?;
    let details = services::recipe_details(&state.db, recipe)
        .await
        .map_err(internal)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/recipes/{}", details.id).parse().unwrap(),
    );

    Ok((StatusCode::CREATED, headers, Json(details)))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    validate(&payload)?;

    let recipe = services::update_recipe(&state.db, user_id, id, &payload)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;
    let details = services::recipe_details(&state.db, recipe)
        .await
        .map_err(internal)?;
    Ok(Json(details))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = Recipe::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Recipe not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /recipes/:id/image (multipart, field `image`)
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<RecipeImageResponse>, (StatusCode, String)> {
    let mut upload: Option<(String, String, Bytes)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field.bytes().await.map_err(internal)?;
            upload = Some((filename, content_type, data));
            break;
        }
    }

    let Some((filename, content_type, data)) = upload else {
        return Err((StatusCode::BAD_REQUEST, "image field is required".into()));
    };
    if data.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image file is empty".into()));
    }

    match services::attach_image(&state, user_id, id, &filename, &content_type, data).await {
        Ok(Some(key)) => Ok(Json(RecipeImageResponse { id, image_key: key })),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Recipe not found".into())),
        Err(e) => {
            error!(error = %e, %user_id, %id, "upload_image failed");
            Err(internal(e))
        }
    }
}

/// GET /recipes/:id/image, 302 to a presigned url for the stored object
#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, (StatusCode, String)> {
    let recipe = Recipe::get(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;

    let key = recipe
        .image_key
        .ok_or((StatusCode::NOT_FOUND, "No image attached".to_string()))?;

    let url = state
        .storage
        .presign_get(&key, 600)
        .await
        .map_err(internal)?;
    Ok(Redirect::temporary(&url))
}
