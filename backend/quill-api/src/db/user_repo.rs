/// User repository - handles all database operations for users
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Create a new user. New accounts are never admins.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    profile_picture: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, is_admin, profile_picture)
        VALUES ($1, $2, $3, FALSE, $4)
        RETURNING id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(profile_picture)
    .fetch_one(pool)
    .await
}

/// Find a user by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Find a user by email
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Whether any account already uses this email
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Whether any account already uses this username
pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

/// Overwrite a user's mutable columns. Callers supply the final values;
/// field-level merge rules live in the service layer.
pub async fn update_user(
    pool: &PgPool,
    id: i64,
    username: &str,
    email: &str,
    password_hash: &str,
    profile_picture: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = $1, email = $2, password_hash = $3, profile_picture = $4,
            updated_at = NOW()
        WHERE id = $5
        RETURNING id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(profile_picture)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a user; returns the number of rows removed.
pub async fn delete_user(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Page through users ordered by creation time.
///
/// `descending` picks the ORDER BY keyword; user input never reaches the
/// SQL text.
pub async fn list_users(
    pool: &PgPool,
    limit: i64,
    offset: i64,
    descending: bool,
) -> Result<Vec<User>, sqlx::Error> {
    let direction = if descending { "DESC" } else { "ASC" };
    let sql = format!(
        r#"
        SELECT id, username, email, password_hash, is_admin, profile_picture, created_at, updated_at
        FROM users
        ORDER BY created_at {direction}
        LIMIT $1 OFFSET $2
        "#
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Total number of accounts
pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

/// Accounts created at or after `since`
pub async fn count_users_created_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}
