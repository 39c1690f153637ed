/// Post repository - handles all database operations for posts
use crate::models::Post;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Create a new post
pub async fn create_post(
    pool: &PgPool,
    title: &str,
    content: &str,
    category: &str,
    slug: &str,
    author_id: i64,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, content, category, slug, author_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, content, category, slug, author_id, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(category)
    .bind(slug)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

/// Find a post by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, category, slug, author_id, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Find a post by its slug
pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, content, category, slug, author_id, created_at, updated_at
        FROM posts
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

/// Whether a post already uses this title
pub async fn title_exists(pool: &PgPool, title: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE title = $1)")
        .bind(title)
        .fetch_one(pool)
        .await
}

/// Whether a post already uses this slug
pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)")
        .bind(slug)
        .fetch_one(pool)
        .await
}

/// Overwrite a post's editable columns. The slug never changes after
/// creation, even when the title does.
pub async fn update_post(
    pool: &PgPool,
    id: i64,
    title: &str,
    content: &str,
    category: &str,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $1, content = $2, category = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING id, title, content, category, slug, author_id, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(category)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a post; returns the number of rows removed.
pub async fn delete_post(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Page through one author's posts ordered by last update.
pub async fn list_by_author(
    pool: &PgPool,
    author_id: i64,
    limit: i64,
    offset: i64,
    descending: bool,
) -> Result<Vec<Post>, sqlx::Error> {
    let direction = if descending { "DESC" } else { "ASC" };
    let sql = format!(
        r#"
        SELECT id, title, content, category, slug, author_id, created_at, updated_at
        FROM posts
        WHERE author_id = $1
        ORDER BY updated_at {direction}
        LIMIT $2 OFFSET $3
        "#
    );

    sqlx::query_as::<_, Post>(&sql)
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Total posts by one author
pub async fn count_by_author(pool: &PgPool, author_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
}

/// Page through posts matching an optional substring filter on title or
/// content (case-sensitive) and an optional exact category.
///
/// NULL filter parameters disable that clause, so one query serves every
/// combination.
pub async fn list_filtered(
    pool: &PgPool,
    search_term: Option<&str>,
    category: Option<&str>,
    limit: i64,
    offset: i64,
    descending: bool,
) -> Result<Vec<Post>, sqlx::Error> {
    let direction = if descending { "DESC" } else { "ASC" };
    let sql = format!(
        r#"
        SELECT id, title, content, category, slug, author_id, created_at, updated_at
        FROM posts
        WHERE ($1::text IS NULL OR title LIKE '%' || $1 || '%' OR content LIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR category = $2)
        ORDER BY updated_at {direction}
        LIMIT $3 OFFSET $4
        "#
    );

    sqlx::query_as::<_, Post>(&sql)
        .bind(search_term)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Posts matching the same filter as [`list_filtered`]
pub async fn count_filtered(
    pool: &PgPool,
    search_term: Option<&str>,
    category: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM posts
        WHERE ($1::text IS NULL OR title LIKE '%' || $1 || '%' OR content LIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR category = $2)
        "#,
    )
    .bind(search_term)
    .bind(category)
    .fetch_one(pool)
    .await
}

/// Total number of posts
pub async fn count_posts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(pool)
        .await
}

/// Posts created at or after `since`
pub async fn count_posts_created_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}
