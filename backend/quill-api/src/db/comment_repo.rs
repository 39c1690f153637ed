/// Comment repository - handles all database operations for comments,
/// including the like-toggle transaction.
use crate::models::Comment;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Create a new comment with an empty like set.
pub async fn create_comment(
    pool: &PgPool,
    content: &str,
    post_id: i64,
    author_id: i64,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (content, post_id, author_id, like_count)
        VALUES ($1, $2, $3, 0)
        RETURNING id, content, post_id, author_id, like_count, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(post_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
}

/// Find a comment by ID
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, content, post_id, author_id, like_count, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// All comments under one post, newest first.
pub async fn list_by_post(pool: &PgPool, post_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, content, post_id, author_id, like_count, created_at, updated_at
        FROM comments
        WHERE post_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

/// Page through comments across all posts ordered by creation time.
pub async fn list_all(
    pool: &PgPool,
    limit: i64,
    offset: i64,
    descending: bool,
) -> Result<Vec<Comment>, sqlx::Error> {
    let direction = if descending { "DESC" } else { "ASC" };
    let sql = format!(
        r#"
        SELECT id, content, post_id, author_id, like_count, created_at, updated_at
        FROM comments
        ORDER BY created_at {direction}
        LIMIT $1 OFFSET $2
        "#
    );

    sqlx::query_as::<_, Comment>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Total number of comments
pub async fn count_comments(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await
}

/// Comments created at or after `since`
pub async fn count_comments_created_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE created_at >= $1")
        .bind(since)
        .fetch_one(pool)
        .await
}

/// Replace a comment's content.
pub async fn update_content(
    pool: &PgPool,
    id: i64,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING id, content, post_id, author_id, like_count, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a comment; returns the number of rows removed.
pub async fn delete_comment(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Flip `user_id`'s like on a comment inside one transaction.
///
/// The comment row is locked up front so concurrent toggles for the same
/// comment serialize; `like_count` therefore always equals the number of
/// rows in `comment_likes` once the transaction commits. Returns `None`
/// when the comment does not exist.
pub async fn toggle_like(
    pool: &PgPool,
    comment_id: i64,
    user_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM comments WHERE id = $1 FOR UPDATE")
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?;

    if locked.is_none() {
        return Ok(None);
    }

    let removed = sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let comment = if removed > 0 {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET like_count = GREATEST(like_count - 1, 0), updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, post_id, author_id, like_count, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .fetch_one(&mut *tx)
        .await?
    } else {
        sqlx::query("INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2)")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET like_count = like_count + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, post_id, author_id, like_count, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .fetch_one(&mut *tx)
        .await?
    };

    tx.commit().await?;

    Ok(Some(comment))
}
