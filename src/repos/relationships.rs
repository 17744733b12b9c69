//! Favorite and follow relations, looked up by composite key.
//!
//! The trait is the seam between request handling and persistence: the
//! aggregator only ever asks the three fact questions, and the mutation
//! endpoints only ever issue the idempotent insert/delete pair.
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::error::RepoError;

#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Does `user_id` currently favorite `article_id`?
    async fn is_favorited(&self, user_id: i64, article_id: i64) -> Result<bool, RepoError>;

    /// Current favoriter count for an article, independent of viewer.
    async fn favorites_count(&self, article_id: i64) -> Result<i64, RepoError>;

    /// Does `follower_id` follow `followee_id`?
    async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool, RepoError>;

    // Mutations are single-statement and idempotent: inserting an existing
    // pair or deleting a missing one is a no-op, never an error. This closes
    // the race window between concurrent togglers without a read-then-write.

    async fn insert_favorite(&self, user_id: i64, article_id: i64) -> Result<(), RepoError>;

    async fn delete_favorite(&self, user_id: i64, article_id: i64) -> Result<(), RepoError>;

    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> Result<(), RepoError>;

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<(), RepoError>;
}

pub struct PgRelationshipStore {
    pool: PgPool,
}

impl PgRelationshipStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationshipStore for PgRelationshipStore {
    async fn is_favorited(&self, user_id: i64, article_id: i64) -> Result<bool, RepoError> {
        let favorited: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM favorites
                WHERE user_id = $1 AND article_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(favorited)
    }

    async fn favorites_count(&self, article_id: i64) -> Result<i64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM favorites
            WHERE article_id = $1
            "#,
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool, RepoError> {
        let following: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM follows
                WHERE follower_id = $1 AND followee_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(following)
    }

    async fn insert_favorite(&self, user_id: i64, article_id: i64) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, article_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, article_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_favorite(&self, user_id: i64, article_id: i64) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND article_id = $2
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followee_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
