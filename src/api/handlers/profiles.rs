/*
 * Responsibility
 * - Profile reads and follow/unfollow mutations
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::profiles::ProfileBody;
use crate::api::extractors::{CurrentUser, Viewer};
use crate::error::AppError;
use crate::repos::user_repo;
use crate::services::aggregator;
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, AppError> {
    let user = user_repo::find_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::not_found("profile"))?;

    let profile = aggregator::profile_view(state.relationships.as_ref(), viewer, &user).await?;
    Ok(Json(ProfileBody { profile }))
}

pub async fn follow_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, AppError> {
    let target = user_repo::find_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::not_found("profile"))?;

    state.relationships.insert_follow(user_id, target.id).await?;

    let profile = aggregator::profile_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &target,
    )
    .await?;
    Ok(Json(ProfileBody { profile }))
}

pub async fn unfollow_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileBody>, AppError> {
    let target = user_repo::find_by_username(&state.db, &username)
        .await?
        .ok_or(AppError::not_found("profile"))?;

    state.relationships.delete_follow(user_id, target.id).await?;

    let profile = aggregator::profile_view(
        state.relationships.as_ref(),
        Viewer::Authenticated(user_id),
        &target,
    )
    .await?;
    Ok(Json(ProfileBody { profile }))
}
