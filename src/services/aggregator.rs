//! Viewer-scoped response aggregation.
//!
//! Joins already-loaded entities with relationship facts (favorited,
//! favoritesCount, following) resolved against the RelationshipStore for the
//! current viewer. Facts are computed fresh per request and never cached on
//! the entity. Invariants:
//!
//! - An anonymous viewer sees `favorited = false` and `following = false`
//!   regardless of storage state.
//! - A viewer never "follows" themselves: `following = false` when the viewer
//!   is the author.
//! - `tagList` keeps attachment order.
//! - A failed fact lookup fails the whole aggregation for that entity; there
//!   is no partial-failure recovery.
use crate::api::dto::articles::ArticleView;
use crate::api::dto::comments::CommentView;
use crate::api::dto::profiles::ProfileView;
use crate::api::extractors::Viewer;
use crate::repos::article_repo::ArticleRecord;
use crate::repos::comment_repo::CommentRow;
use crate::repos::error::RepoError;
use crate::repos::relationships::RelationshipStore;
use crate::repos::user_repo::UserRow;

pub async fn article_view(
    store: &dyn RelationshipStore,
    viewer: Viewer,
    record: &ArticleRecord,
) -> Result<ArticleView, RepoError> {
    let article = &record.article;

    let favorited = match viewer.user_id() {
        Some(user_id) => store.is_favorited(user_id, article.id).await?,
        None => false,
    };
    let favorites_count = store.favorites_count(article.id).await?;
    let following = follows_author(store, viewer, article.author_id).await?;

    Ok(ArticleView {
        slug: article.slug.clone(),
        title: article.title.clone(),
        description: article.description.clone(),
        body: article.body.clone(),
        tag_list: record.tags.clone(),
        created_at: article.created_at,
        updated_at: article.updated_at,
        favorited,
        favorites_count,
        author: ProfileView {
            username: article.author_username.clone(),
            bio: article.author_bio.clone(),
            image: article.author_image.clone(),
            following,
        },
    })
}

/// Aggregate a page of articles. Lookups are per-article and read-only; no
/// transaction spans the list.
pub async fn article_views(
    store: &dyn RelationshipStore,
    viewer: Viewer,
    records: &[ArticleRecord],
) -> Result<Vec<ArticleView>, RepoError> {
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        views.push(article_view(store, viewer, record).await?);
    }
    Ok(views)
}

pub async fn profile_view(
    store: &dyn RelationshipStore,
    viewer: Viewer,
    user: &UserRow,
) -> Result<ProfileView, RepoError> {
    let following = follows_author(store, viewer, user.id).await?;

    Ok(ProfileView {
        username: user.username.clone(),
        bio: user.bio.clone(),
        image: user.image.clone(),
        following,
    })
}

pub async fn comment_view(
    store: &dyn RelationshipStore,
    viewer: Viewer,
    row: &CommentRow,
) -> Result<CommentView, RepoError> {
    let following = follows_author(store, viewer, row.author_id).await?;

    Ok(CommentView {
        id: row.id,
        body: row.body.clone(),
        created_at: row.created_at,
        updated_at: row.updated_at,
        author: ProfileView {
            username: row.author_username.clone(),
            bio: row.author_bio.clone(),
            image: row.author_image.clone(),
            following,
        },
    })
}

pub async fn comment_views(
    store: &dyn RelationshipStore,
    viewer: Viewer,
    rows: &[CommentRow],
) -> Result<Vec<CommentView>, RepoError> {
    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        views.push(comment_view(store, viewer, row).await?);
    }
    Ok(views)
}

async fn follows_author(
    store: &dyn RelationshipStore,
    viewer: Viewer,
    author_id: i64,
) -> Result<bool, RepoError> {
    match viewer.user_id() {
        Some(user_id) if user_id != author_id => store.is_following(user_id, author_id).await,
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::repos::article_repo::ArticleRow;
    use crate::repos::relationships::testing::MemoryRelationshipStore;

    const AUTHOR: i64 = 1;
    const READER: i64 = 2;

    fn record() -> ArticleRecord {
        ArticleRecord {
            article: ArticleRow {
                id: 10,
                slug: "how-to-train-your-dragon".to_string(),
                title: "How to train your dragon".to_string(),
                description: "Ever wonder how?".to_string(),
                body: "You have to believe".to_string(),
                author_id: AUTHOR,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                author_username: "jake".to_string(),
                author_bio: "I work at statefarm".to_string(),
                author_image: None,
            },
            tags: vec!["dragons".to_string(), "training".to_string()],
        }
    }

    #[tokio::test]
    async fn anonymous_viewer_sees_false_facts_regardless_of_storage() {
        let store = MemoryRelationshipStore::default();
        store.insert_favorite(READER, 10).await.unwrap();
        store.insert_follow(READER, AUTHOR).await.unwrap();

        let view = article_view(&store, Viewer::Anonymous, &record())
            .await
            .unwrap();

        assert!(!view.favorited);
        assert!(!view.author.following);
        // the global count still reflects storage
        assert_eq!(view.favorites_count, 1);
    }

    #[tokio::test]
    async fn favoriter_sees_favorited_true() {
        let store = MemoryRelationshipStore::default();
        store.insert_favorite(READER, 10).await.unwrap();

        let view = article_view(&store, Viewer::Authenticated(READER), &record())
            .await
            .unwrap();

        assert!(view.favorited);
        assert_eq!(view.favorites_count, 1);
    }

    #[tokio::test]
    async fn favorite_is_idempotent_through_the_store() {
        let store = MemoryRelationshipStore::default();
        store.insert_favorite(READER, 10).await.unwrap();
        store.insert_favorite(READER, 10).await.unwrap();

        let view = article_view(&store, Viewer::Authenticated(READER), &record())
            .await
            .unwrap();

        assert!(view.favorited);
        assert_eq!(view.favorites_count, 1);

        store.delete_favorite(READER, 10).await.unwrap();
        store.delete_favorite(READER, 10).await.unwrap();

        let view = article_view(&store, Viewer::Authenticated(READER), &record())
            .await
            .unwrap();

        assert!(!view.favorited);
        assert_eq!(view.favorites_count, 0);
    }

    #[tokio::test]
    async fn author_never_follows_themselves() {
        let store = MemoryRelationshipStore::default();
        // even if storage claims a self-follow exists
        store.insert_follow(AUTHOR, AUTHOR).await.unwrap();

        let view = article_view(&store, Viewer::Authenticated(AUTHOR), &record())
            .await
            .unwrap();

        assert!(!view.author.following);
    }

    #[tokio::test]
    async fn follower_sees_following_true() {
        let store = MemoryRelationshipStore::default();
        store.insert_follow(READER, AUTHOR).await.unwrap();

        let view = article_view(&store, Viewer::Authenticated(READER), &record())
            .await
            .unwrap();

        assert!(view.author.following);
    }

    #[tokio::test]
    async fn tag_list_keeps_attachment_order() {
        let store = MemoryRelationshipStore::default();
        let view = article_view(&store, Viewer::Anonymous, &record())
            .await
            .unwrap();
        assert_eq!(view.tag_list, vec!["dragons", "training"]);
    }

    #[tokio::test]
    async fn profile_view_is_viewer_relative() {
        let store = MemoryRelationshipStore::default();
        store.insert_follow(READER, AUTHOR).await.unwrap();

        let author = UserRow {
            id: AUTHOR,
            username: "jake".to_string(),
            email: "jake@jake.jake".to_string(),
            password_hash: String::new(),
            bio: String::new(),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let as_reader = profile_view(&store, Viewer::Authenticated(READER), &author)
            .await
            .unwrap();
        assert!(as_reader.following);

        let as_anonymous = profile_view(&store, Viewer::Anonymous, &author)
            .await
            .unwrap();
        assert!(!as_anonymous.following);

        let as_self = profile_view(&store, Viewer::Authenticated(AUTHOR), &author)
            .await
            .unwrap();
        assert!(!as_self.following);
    }
}
