/*
 * Responsibility
 * - Article CRUD, listing/feed, favorite toggles and the tag list
 * - Handlers load entities, then hand them to the aggregator for
 *   viewer-relative assembly
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::dto::articles::{
    ArticleBody, ArticleListQuery, ArticlesBody, CreateArticleRequest, TagsBody,
    UpdateArticleRequest,
};
use crate::api::extractors::{CurrentUser, Viewer};
use crate::error::AppError;
use crate::repos::article_repo::{self, ListFilters};
use crate::services::aggregator;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset.unwrap_or(0).max(0),
    )
}

pub async fn list_articles(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<ArticlesBody>, AppError> {
    let (limit, offset) = page(query.limit, query.offset);
    let filters = ListFilters {
        tag: query.tag,
        author: query.author,
        favorited: query.favorited,
        limit,
        offset,
    };

    let records = article_repo::list(&state.db, &filters).await?;
    let articles_count = article_repo::count(&state.db, &filters).await?;
    let articles =
        aggregator::article_views(state.relationships.as_ref(), viewer, &records).await?;

    Ok(Json(ArticlesBody {
        articles,
        articles_count,
    }))
}

pub async fn feed_articles(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ArticleListQuery>,
) -> Result<Json<ArticlesBody>, AppError> {
    let (limit, offset) = page(query.limit, query.offset);

    let records = article_repo::feed(&state.db, user_id, limit, offset).await?;
    let articles_count = article_repo::feed_count(&state.db, user_id).await?;
    let articles = aggregator::article_views(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &records,
    )
    .await?;

    Ok(Json(ArticlesBody {
        articles,
        articles_count,
    }))
}

pub async fn get_article(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Json<ArticleBody>, AppError> {
    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;

    let article = aggregator::article_view(state.relationships.as_ref(), viewer, &record).await?;
    Ok(Json(ArticleBody { article }))
}

pub async fn create_article(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleBody>), AppError> {
    req.validate()?;

    // The slug is derived from the title exactly once, at creation.
    let slug = slug::slugify(&req.article.title);

    let record = article_repo::create(
        &state.db,
        user_id,
        &slug,
        &req.article.title,
        &req.article.description,
        &req.article.body,
        &req.article.tag_list,
    )
    .await?;

    let article = aggregator::article_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &record,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ArticleBody { article })))
}

pub async fn update_article(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
    Json(req): Json<UpdateArticleRequest>,
) -> Result<Json<ArticleBody>, AppError> {
    req.validate()?;

    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;
    if record.article.author_id != user_id {
        return Err(AppError::forbidden("article", "not the author"));
    }

    article_repo::update(
        &state.db,
        &slug,
        req.article.title.as_deref(),
        req.article.description.as_deref(),
        req.article.body.as_deref(),
    )
    .await?;

    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;
    let article = aggregator::article_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &record,
    )
    .await?;
    Ok(Json(ArticleBody { article }))
}

pub async fn delete_article(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;
    if record.article.author_id != user_id {
        return Err(AppError::forbidden("article", "not the author"));
    }

    article_repo::delete(&state.db, record.article.id).await?;
    Ok(StatusCode::OK)
}

pub async fn favorite_article(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleBody>, AppError> {
    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;

    // Idempotent: favoriting twice is a no-op, and the response reflects the
    // current aggregated state either way.
    state
        .relationships
        .insert_favorite(user_id, record.article.id)
        .await?;

    let article = aggregator::article_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &record,
    )
    .await?;
    Ok(Json(ArticleBody { article }))
}

pub async fn unfavorite_article(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
) -> Result<Json<ArticleBody>, AppError> {
    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;

    // Idempotent: unfavoriting a never-favorited article is not an error.
    state
        .relationships
        .delete_favorite(user_id, record.article.id)
        .await?;

    let article = aggregator::article_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &record,
    )
    .await?;
    Ok(Json(ArticleBody { article }))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagsBody>, AppError> {
    let tags = article_repo::all_tags(&state.db).await?;
    Ok(Json(TagsBody { tags }))
}
