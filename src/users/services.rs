use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::password::hash_password;
use crate::users::repo_types::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("an email address is required")]
    EmailRequired,
    #[error("email is already registered")]
    EmailTaken,
    #[error("failed to hash password")]
    Hash(#[source] anyhow::Error),
    #[error("database error")]
    Database(#[source] anyhow::Error),
}

/// Lowercase the domain portion of an email, leaving the local part untouched.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Create and persist a new user account.
///
/// The email is required and gets its domain lowercased before the insert;
/// the password is hashed here so callers never handle the hash themselves.
pub async fn create_user(
    db: &PgPool,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, UserError> {
    if email.trim().is_empty() {
        return Err(UserError::EmailRequired);
    }

    let email = normalize_email(email);
    let hash = hash_password(password).map_err(UserError::Hash)?;

    let user = match User::create(db, &email, name, &hash).await {
        Ok(u) => u,
        Err(e) => {
            // 23505 = unique violation on users.email
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.code().as_deref() == Some("23505") {
                    return Err(UserError::EmailTaken);
                }
            }
            return Err(UserError::Database(e.into()));
        }
    };

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(user)
}

/// Create a user and promote it to staff + superuser.
///
/// Two sequential writes; there is no transaction across them.
pub async fn create_superuser(db: &PgPool, email: &str, password: &str) -> Result<User, UserError> {
    let user = create_user(db, email, password, "").await?;
    let user = User::promote(db, user.id).await.map_err(UserError::Database)?;
    info!(user_id = %user.id, email = %user.email, "superuser created");
    Ok(user)
}

/// Startup helper: create the superuser unless that email already exists.
pub async fn ensure_superuser(db: &PgPool, email: &str, password: &str) -> Result<(), UserError> {
    let existing = User::find_by_email(db, &normalize_email(email))
        .await
        .map_err(UserError::Database)?;
    if existing.is_some() {
        debug!(email = %email, "admin account already present");
        return Ok(());
    }
    create_superuser(db, email, password).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(normalize_email("Chef@EXAMPLE.COM"), "Chef@example.com");
        assert_eq!(normalize_email("  plain@Example.Org  "), "plain@example.org");
    }

    #[test]
    fn normalize_leaves_invalid_input_alone() {
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn create_user_rejects_empty_email() {
        let state = AppState::fake();
        let err = create_user(&state.db, "", "some-password", "")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailRequired));
    }

    #[tokio::test]
    async fn create_user_rejects_blank_email() {
        let state = AppState::fake();
        let err = create_user(&state.db, "   ", "some-password", "")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailRequired));
    }
}
