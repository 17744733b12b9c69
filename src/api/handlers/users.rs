/*
 * Responsibility
 * - Registration, login and the current-user endpoints
 * - DTO validation -> repo/service calls -> user view with a fresh token
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::users::{
    LoginRequest, RegisterRequest, UpdateUserRequest, UserBody, UserView,
};
use crate::api::extractors::CurrentUser;
use crate::error::AppError;
use crate::repos::user_repo;
use crate::services::password;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserBody>), AppError> {
    req.validate()?;

    let password_hash = password::hash(req.user.password.clone()).await?;
    let row = user_repo::create(&state.db, &req.user.username, &req.user.email, &password_hash)
        .await?;

    let token = state.tokens.issue(row.id)?;
    Ok((
        StatusCode::CREATED,
        Json(UserBody {
            user: UserView::from_row(row, token),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserBody>, AppError> {
    req.validate()?;

    // Unknown email and wrong password are indistinguishable on the wire.
    let row = user_repo::find_by_email(&state.db, &req.user.email)
        .await?
        .ok_or_else(|| AppError::denied("user", "wrong username or password"))?;

    let ok = password::verify(req.user.password.clone(), row.password_hash.clone()).await?;
    if !ok {
        return Err(AppError::denied("user", "wrong username or password"));
    }

    let token = state.tokens.issue(row.id)?;
    Ok(Json(UserBody {
        user: UserView::from_row(row, token),
    }))
}

pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserBody>, AppError> {
    let row = user_repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = state.tokens.issue(row.id)?;
    Ok(Json(UserBody {
        user: UserView::from_row(row, token),
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserBody>, AppError> {
    req.validate()?;

    let password_hash = match &req.user.password {
        Some(plain) => Some(password::hash(plain.clone()).await?),
        None => None,
    };
    let image: Option<Option<&str>> = req.user.image.as_ref().map(|inner| inner.as_deref());

    let row = user_repo::update(
        &state.db,
        user_id,
        req.user.username.as_deref(),
        req.user.email.as_deref(),
        req.user.bio.as_deref(),
        image,
        password_hash.as_deref(),
    )
    .await?
    .ok_or(AppError::Unauthorized)?;

    let token = state.tokens.issue(row.id)?;
    Ok(Json(UserBody {
        user: UserView::from_row(row, token),
    }))
}
