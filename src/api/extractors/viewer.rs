/*
 * Responsibility
 * - The viewer context type handed from the auth gate to handlers
 * - Handlers receive this type only; token decoding never happens here
 */
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Identity resolved for the current request.
///
/// Created once per request by the auth gate, read-only for the rest of the
/// request, discarded at request end. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated(i64),
}

impl Viewer {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Viewer::Authenticated(id) => Some(*id),
            Viewer::Anonymous => None,
        }
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A missing extension means the route group was wired without a gate,
        // which is a routing bug, not a client error.
        parts
            .extensions
            .get::<Viewer>()
            .copied()
            .ok_or(AppError::Internal)
    }
}

/// Authenticated user id, for handlers behind the required gate.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await?;
        viewer.user_id().map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}
