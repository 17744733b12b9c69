/*
 * Responsibility
 * - Comment list/create/delete, scoped to an article by slug
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::comments::{CommentBody, CommentsBody, CreateCommentRequest};
use crate::api::extractors::{CurrentUser, Viewer};
use crate::error::AppError;
use crate::repos::{article_repo, comment_repo};
use crate::services::aggregator;
use crate::state::AppState;

pub async fn list_comments(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(slug): Path<String>,
) -> Result<Json<CommentsBody>, AppError> {
    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;

    let rows = comment_repo::list_for_article(&state.db, record.article.id).await?;
    let comments = aggregator::comment_views(state.relationships.as_ref(), viewer, &rows).await?;
    Ok(Json(CommentsBody { comments }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(slug): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentBody>), AppError> {
    req.validate()?;

    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;

    let row = comment_repo::create(&state.db, record.article.id, user_id, &req.comment.body)
        .await?;
    let comment = aggregator::comment_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &row,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CommentBody { comment })))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path((slug, comment_id)): Path<(String, i64)>,
) -> Result<StatusCode, AppError> {
    let record = article_repo::find_by_slug(&state.db, &slug)
        .await?
        .ok_or(AppError::not_found("article"))?;

    let deleted =
        comment_repo::delete(&state.db, record.article.id, comment_id, user_id).await?;
    if !deleted {
        return Err(AppError::not_found("comment"));
    }
    Ok(StatusCode::OK)
}
