/*
 * Responsibility
 * - SQLx operations for article comments
 * - Comment bodies are immutable after creation (no update path)
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoError;

/// Comment row with author columns joined flat.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub article_id: i64,
    pub author_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_bio: String,
    pub author_image: Option<String>,
}

pub async fn create(
    pool: &PgPool,
    article_id: i64,
    author_id: i64,
    body: &str,
) -> Result<CommentRow, RepoError> {
    let comment_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO comments (article_id, author_id, body)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(article_id)
    .bind(author_id)
    .bind(body)
    .fetch_one(pool)
    .await?;

    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.article_id, c.author_id, c.body, c.created_at, c.updated_at,
               u.username AS author_username, u.bio AS author_bio, u.image AS author_image
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn list_for_article(
    pool: &PgPool,
    article_id: i64,
) -> Result<Vec<CommentRow>, RepoError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.article_id, c.author_id, c.body, c.created_at, c.updated_at,
               u.username AS author_username, u.bio AS author_bio, u.image AS author_image
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.article_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Author-scoped delete: only the comment's author may remove it. Returns
/// whether a row was deleted.
pub async fn delete(
    pool: &PgPool,
    article_id: i64,
    comment_id: i64,
    author_id: i64,
) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM comments
        WHERE id = $1 AND article_id = $2 AND author_id = $3
        "#,
    )
    .bind(comment_id)
    .bind(article_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
