use anyhow::Context;
use bytes::Bytes;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::recipes::dto::{RecipeDetails, RecipePayload};
use crate::recipes::repo;
use crate::recipes::repo_types::{NewRecipe, Recipe};
use crate::state::AppState;

/// Build the storage key for a freshly uploaded recipe image.
///
/// The key keeps the client's file extension; a filename without one just
/// yields a bare identifier. Collisions are avoided by the random id alone.
pub fn recipe_image_path(original_filename: &str) -> String {
    let ext = std::path::Path::new(original_filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("uploads/recipe/{}{}", Uuid::new_v4(), ext)
}

fn as_new<'a>(payload: &'a RecipePayload) -> NewRecipe<'a> {
    NewRecipe {
        title: &payload.title,
        description: payload.description.as_deref(),
        time_minutes: payload.time_minutes,
        price: payload.price,
        link: payload.link.as_deref(),
    }
}

/// Insert a recipe and its tag/ingredient links in one transaction.
pub async fn create_recipe(
    db: &PgPool,
    user_id: Uuid,
    payload: &RecipePayload,
) -> anyhow::Result<Recipe> {
    let mut tx = db.begin().await.context("begin tx")?;
    let recipe = Recipe::insert_tx(&mut tx, user_id, &as_new(payload)).await?;
    repo::replace_tag_links_tx(&mut tx, recipe.id, user_id, &payload.tag_ids).await?;
    repo::replace_ingredient_links_tx(&mut tx, recipe.id, user_id, &payload.ingredient_ids).await?;
    tx.commit().await.context("commit tx")?;
    Ok(recipe)
}

/// Replace a recipe and its links; `None` when it is missing or foreign.
pub async fn update_recipe(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    payload: &RecipePayload,
) -> anyhow::Result<Option<Recipe>> {
    let mut tx = db.begin().await.context("begin tx")?;
    let Some(recipe) = Recipe::update_tx(&mut tx, user_id, id, &as_new(payload)).await? else {
        return Ok(None);
    };
    repo::replace_tag_links_tx(&mut tx, recipe.id, user_id, &payload.tag_ids).await?;
    repo::replace_ingredient_links_tx(&mut tx, recipe.id, user_id, &payload.ingredient_ids).await?;
    tx.commit().await.context("commit tx")?;
    Ok(Some(recipe))
}

pub async fn recipe_details(db: &PgPool, recipe: Recipe) -> anyhow::Result<RecipeDetails> {
    let tags = repo::tags_for(db, recipe.id).await?;
    let ingredients = repo::ingredients_for(db, recipe.id).await?;
    Ok(RecipeDetails {
        id: recipe.id,
        title: recipe.title,
        description: recipe.description,
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link,
        image_key: recipe.image_key,
        tags: tags.into_iter().map(Into::into).collect(),
        ingredients: ingredients.into_iter().map(Into::into).collect(),
        created_at: recipe.created_at,
    })
}

/// Store an uploaded image and record its key on the recipe.
///
/// Returns the new key, or `None` when the recipe does not exist for this
/// user. The previous object, if any, is deleted best-effort afterwards.
pub async fn attach_image(
    st: &AppState,
    user_id: Uuid,
    recipe_id: Uuid,
    filename: &str,
    content_type: &str,
    body: Bytes,
) -> anyhow::Result<Option<String>> {
    let Some(recipe) = Recipe::get(&st.db, user_id, recipe_id).await? else {
        return Ok(None);
    };

    let key = recipe_image_path(filename);
    st.storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    Recipe::set_image_key(&st.db, user_id, recipe_id, &key).await?;

    if let Some(old) = recipe.image_key {
        if let Err(e) = st.storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "failed to delete replaced image");
        }
    }

    Ok(Some(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_path_keeps_extension() {
        let path = recipe_image_path("dinner.jpg");
        assert!(path.starts_with("uploads/recipe/"));
        assert!(path.ends_with(".jpg"));
    }

    #[test]
    fn image_path_without_extension() {
        let path = recipe_image_path("dinner");
        assert!(path.starts_with("uploads/recipe/"));
        assert!(!path.contains('.'));
    }

    #[test]
    fn image_path_uses_last_extension_only() {
        let path = recipe_image_path("archive.tar.gz");
        assert!(path.ends_with(".gz"));
        assert!(!path.contains("tar"));
    }

    #[test]
    fn image_paths_never_repeat() {
        let a = recipe_image_path("photo.png");
        let b = recipe_image_path("photo.png");
        assert_ne!(a, b);
    }
}
