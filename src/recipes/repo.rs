use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::ingredients::repo_types::Ingredient;
use crate::recipes::repo_types::{NewRecipe, Recipe};
use crate::tags::repo_types::Tag;

const RECIPE_COLUMNS: &str =
    "id, user_id, title, description, time_minutes, price, link, image_key, created_at";

impl Recipe {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            SELECT {RECIPE_COLUMNS}
            FROM recipes
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(recipe)
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        new: &NewRecipe<'_>,
    ) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (user_id, title, description, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(new.link)
        .fetch_one(&mut **tx)
        .await?;
        Ok(recipe)
    }

    /// Full update of the editable fields; `None` when the recipe does not
    /// exist or is owned by someone else.
    pub async fn update_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        id: Uuid,
        new: &NewRecipe<'_>,
    ) -> anyhow::Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET title = $3, description = $4, time_minutes = $5, price = $6, link = $7
            WHERE id = $1 AND user_id = $2
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.time_minutes)
        .bind(new.price)
        .bind(new.link)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(recipe)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_image_key(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        key: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE recipes SET image_key = $3 WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .bind(key)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Replace the tag associations of a recipe. Ids that do not exist or belong
/// to another user are skipped rather than rejected.
pub async fn replace_tag_links_tx(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    tag_ids: &[Uuid],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, t.id FROM tags t
        WHERE t.id = ANY($2) AND t.user_id = $3
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(tag_ids)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Same as [`replace_tag_links_tx`] for ingredients.
pub async fn replace_ingredient_links_tx(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    ingredient_ids: &[Uuid],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    if ingredient_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id)
        SELECT $1, i.id FROM ingredients i
        WHERE i.id = ANY($2) AND i.user_id = $3
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(recipe_id)
    .bind(ingredient_ids)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn tags_for(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<Tag>> {
    let rows = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.user_id, t.name, t.created_at
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = $1
        ORDER BY t.name ASC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn ingredients_for(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<Ingredient>> {
    let rows = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT i.id, i.user_id, i.name, i.created_at
        FROM ingredients i
        JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
        WHERE ri.recipe_id = $1
        ORDER BY i.name ASC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
