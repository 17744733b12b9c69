/*
 * Responsibility
 * - Comment create DTO and wire views
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::{max_len, profiles::ProfileView, required};
use crate::error::{AppError, FieldError};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub comment: CreateComment,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub body: String,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut failures: Vec<FieldError> = Vec::new();

        if let Some(f) = required("Body", &self.comment.body)
            .or_else(|| max_len("Body", &self.comment.body, 2048))
        {
            failures.push(f);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(failures))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentBody {
    pub comment: CommentView,
}

#[derive(Debug, Serialize)]
pub struct CommentsBody {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: ProfileView,
}
