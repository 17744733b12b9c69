/*
 * Responsibility
 * - SQLx operations for articles, their tag associations and the tags table
 * - Author columns are joined flat into the row; tags load per article so the
 *   I/O cost stays visible at each call site
 */
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};

use crate::repos::error::RepoError;

/// Article row with author columns joined flat.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_bio: String,
    pub author_image: Option<String>,
}

/// An article with its tag texts, in the order the tags were attached.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub article: ArticleRow,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ListFilters {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn create(
    pool: &PgPool,
    author_id: i64,
    slug: &str,
    title: &str,
    description: &str,
    body: &str,
    tags: &[String],
) -> Result<ArticleRecord, RepoError> {
    let mut tx = pool.begin().await?;

    let article_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO articles (slug, title, description, body, author_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(slug)
    .bind(title)
    .bind(description)
    .bind(body)
    .bind(author_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(RepoError::from_sqlx)?;

    // Tags are deduplicated by text; association order is preserved by the
    // article_tags serial key.
    let mut seen: Vec<&str> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || seen.contains(&tag) {
            continue;
        }
        seen.push(tag);

        let tag_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tags (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(tag)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO article_tags (article_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT (article_id, tag_id) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await?;
    }

    let article = sqlx::query_as::<_, ArticleRow>(
        r#"
        SELECT a.id, a.slug, a.title, a.description, a.body, a.author_id,
               a.created_at, a.updated_at,
               u.username AS author_username, u.bio AS author_bio, u.image AS author_image
        FROM articles a
        JOIN users u ON u.id = a.author_id
        WHERE a.id = $1
        "#,
    )
    .bind(article_id)
    .fetch_one(&mut *tx)
    .await?;

    let tags = tags_for(&mut *tx, article_id).await?;

    tx.commit().await?;

    Ok(ArticleRecord { article, tags })
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<ArticleRecord>, RepoError> {
    let row = sqlx::query_as::<_, ArticleRow>(
        r#"
        SELECT a.id, a.slug, a.title, a.description, a.body, a.author_id,
               a.created_at, a.updated_at,
               u.username AS author_username, u.bio AS author_bio, u.image AS author_image
        FROM articles a
        JOIN users u ON u.id = a.author_id
        WHERE a.slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(article) => {
            let tags = tags_for(pool, article.id).await?;
            Ok(Some(ArticleRecord { article, tags }))
        }
        None => Ok(None),
    }
}

pub async fn list(pool: &PgPool, filters: &ListFilters) -> Result<Vec<ArticleRecord>, RepoError> {
    let rows = sqlx::query_as::<_, ArticleRow>(
        r#"
        SELECT a.id, a.slug, a.title, a.description, a.body, a.author_id,
               a.created_at, a.updated_at,
               u.username AS author_username, u.bio AS author_bio, u.image AS author_image
        FROM articles a
        JOIN users u ON u.id = a.author_id
        WHERE ($1::text IS NULL OR u.username = $1)
          AND ($2::text IS NULL OR EXISTS (
                SELECT 1 FROM article_tags at
                JOIN tags t ON t.id = at.tag_id
                WHERE at.article_id = a.id AND t.name = $2))
          AND ($3::text IS NULL OR EXISTS (
                SELECT 1 FROM favorites f
                JOIN users fu ON fu.id = f.user_id
                WHERE f.article_id = a.id AND fu.username = $3))
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(filters.author.as_deref())
    .bind(filters.tag.as_deref())
    .bind(filters.favorited.as_deref())
    .bind(filters.limit)
    .bind(filters.offset)
    .fetch_all(pool)
    .await?;

    with_tags(pool, rows).await
}

pub async fn count(pool: &PgPool, filters: &ListFilters) -> Result<i64, RepoError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM articles a
        JOIN users u ON u.id = a.author_id
        WHERE ($1::text IS NULL OR u.username = $1)
          AND ($2::text IS NULL OR EXISTS (
                SELECT 1 FROM article_tags at
                JOIN tags t ON t.id = at.tag_id
                WHERE at.article_id = a.id AND t.name = $2))
          AND ($3::text IS NULL OR EXISTS (
                SELECT 1 FROM favorites f
                JOIN users fu ON fu.id = f.user_id
                WHERE f.article_id = a.id AND fu.username = $3))
        "#,
    )
    .bind(filters.author.as_deref())
    .bind(filters.tag.as_deref())
    .bind(filters.favorited.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Articles authored by users the viewer follows, newest first.
pub async fn feed(
    pool: &PgPool,
    viewer_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ArticleRecord>, RepoError> {
    let rows = sqlx::query_as::<_, ArticleRow>(
        r#"
        SELECT a.id, a.slug, a.title, a.description, a.body, a.author_id,
               a.created_at, a.updated_at,
               u.username AS author_username, u.bio AS author_bio, u.image AS author_image
        FROM articles a
        JOIN users u ON u.id = a.author_id
        WHERE EXISTS (
            SELECT 1 FROM follows f
            WHERE f.follower_id = $1 AND f.followee_id = a.author_id)
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(viewer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    with_tags(pool, rows).await
}

pub async fn feed_count(pool: &PgPool, viewer_id: i64) -> Result<i64, RepoError> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM articles a
        WHERE EXISTS (
            SELECT 1 FROM follows f
            WHERE f.follower_id = $1 AND f.followee_id = a.author_id)
        "#,
    )
    .bind(viewer_id)
    .fetch_one(pool)
    .await?;

    Ok(total)
}

/// Update title/description/body by slug. The slug itself is never
/// regenerated. Returns whether a row matched.
pub async fn update(
    pool: &PgPool,
    slug: &str,
    title: Option<&str>,
    description: Option<&str>,
    body: Option<&str>,
) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        UPDATE articles
        SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            body = COALESCE($4, body),
            updated_at = now()
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .bind(title)
    .bind(description)
    .bind(body)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an article. Comments, favorites and tag links go with it (FK
/// cascade).
pub async fn delete(pool: &PgPool, article_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM articles
        WHERE id = $1
        "#,
    )
    .bind(article_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Every known tag text, oldest first.
pub async fn all_tags(pool: &PgPool) -> Result<Vec<String>, RepoError> {
    let tags: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name
        FROM tags
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Tag texts for one article, in attachment order.
async fn tags_for<'e, E>(executor: E, article_id: i64) -> Result<Vec<String>, RepoError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let tags: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT t.name
        FROM article_tags at
        JOIN tags t ON t.id = at.tag_id
        WHERE at.article_id = $1
        ORDER BY at.id
        "#,
    )
    .bind(article_id)
    .fetch_all(executor)
    .await?;

    Ok(tags)
}

async fn with_tags(pool: &PgPool, rows: Vec<ArticleRow>) -> Result<Vec<ArticleRecord>, RepoError> {
    let mut records = Vec::with_capacity(rows.len());
    for article in rows {
        let tags = tags_for(pool, article.id).await?;
        records.push(ArticleRecord { article, tags });
    }
    Ok(records)
}
