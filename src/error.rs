/*
 * Responsibility
 * - Application-wide AppError definition
 * - IntoResponse implementation (HTTP status / JSON error envelope)
 * - Translation of field validation failures into the wire format
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::repos::error::RepoError;

/// A single field-level validation failure: the field it concerns, the rule
/// tag that failed (`required`, `min`, `alphanum`, ...) and the rule's
/// optional parameter (e.g. the minimum length).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub tag: &'static str,
    pub param: Option<String>,
}

impl FieldError {
    pub fn new(field: &'static str, tag: &'static str) -> Self {
        Self {
            field,
            tag,
            param: None,
        }
    }

    pub fn with_param(field: &'static str, tag: &'static str, param: impl ToString) -> Self {
        Self {
            field,
            tag,
            param: Some(param.to_string()),
        }
    }

    /// Wire rendering of a single failure:
    /// - with a parameter: `{min: 8}`
    /// - without: `{key: alphanum}`
    fn message(&self) -> String {
        match &self.param {
            Some(param) => format!("{{{}: {}}}", self.tag, param),
            None => format!("{{key: {}}}", self.tag),
        }
    }
}

/// Uniform error envelope: `{"errors": {<field-or-key>: <message>}}`.
#[derive(Debug, Serialize)]
pub struct ErrorsBody {
    pub errors: Map<String, Value>,
}

impl ErrorsBody {
    pub fn single(key: &str, message: impl Into<String>) -> Self {
        let mut errors = Map::new();
        errors.insert(key.to_string(), Value::String(message.into()));
        Self { errors }
    }
}

/// Convert validation failures into the field-keyed envelope map.
///
/// When several failures target the same field, the last one processed wins
/// (no array accumulation). That is the published wire contract and must not
/// change.
pub fn translate_failures(failures: &[FieldError]) -> Map<String, Value> {
    let mut errors = Map::new();
    for failure in failures {
        errors.insert(
            failure.field.to_string(),
            Value::String(failure.message()),
        );
    }
    errors
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Auth-gate rejection. Deliberately bodyless so forgery attempts cannot
    /// distinguish a bad signature from an expired token.
    #[error("unauthorized")]
    Unauthorized,

    #[error("{message}")]
    Denied {
        key: &'static str,
        message: &'static str,
    },

    #[error("{message}")]
    Forbidden {
        key: &'static str,
        message: &'static str,
    },

    #[error("{key} not found")]
    NotFound { key: &'static str },

    #[error("{message}")]
    Conflict { key: &'static str, message: String },

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn denied(key: &'static str, message: &'static str) -> Self {
        Self::Denied { key, message }
    }

    pub fn forbidden(key: &'static str, message: &'static str) -> Self {
        Self::Forbidden { key, message }
    }

    pub fn not_found(key: &'static str) -> Self {
        Self::NotFound { key }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(failures) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorsBody {
                    errors: translate_failures(&failures),
                }),
            )
                .into_response(),
            AppError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            AppError::Denied { key, message } => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorsBody::single(key, message)),
            )
                .into_response(),
            AppError::Forbidden { key, message } => (
                StatusCode::FORBIDDEN,
                Json(ErrorsBody::single(key, message)),
            )
                .into_response(),
            AppError::NotFound { key } => (
                StatusCode::NOT_FOUND,
                Json(ErrorsBody::single(key, "not found")),
            )
                .into_response(),
            AppError::Conflict { key, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorsBody::single(key, message)),
            )
                .into_response(),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorsBody::single("server", "internal server error")),
            )
                .into_response(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(message) => AppError::Conflict {
                key: "database",
                message,
            },
            // Storage failures are not retried here; they surface as an
            // opaque 500 and the detail stays in the logs.
            RepoError::Db(e) => {
                tracing::error!(error = ?e, "storage failure");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_with_param_renders_tag_and_param() {
        let failure = FieldError::with_param("Password", "min", 8);
        assert_eq!(failure.message(), "{min: 8}");
    }

    #[test]
    fn failure_without_param_renders_key_and_tag() {
        let failure = FieldError::new("Username", "alphanum");
        assert_eq!(failure.message(), "{key: alphanum}");
    }

    #[test]
    fn translation_keeps_every_failing_field() {
        let failures = vec![
            FieldError::with_param("Password", "min", 8),
            FieldError::new("Username", "alphanum"),
        ];
        let errors = translate_failures(&failures);
        assert_eq!(errors["Password"], "{min: 8}");
        assert_eq!(errors["Username"], "{key: alphanum}");
    }

    #[test]
    fn last_failure_wins_per_field() {
        let failures = vec![
            FieldError::new("Username", "required"),
            FieldError::with_param("Username", "min", 4),
        ];
        let errors = translate_failures(&failures);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["Username"], "{min: 4}");
    }

    #[test]
    fn validation_envelope_shape() {
        let body = ErrorsBody {
            errors: translate_failures(&[FieldError::with_param("Password", "min", 8)]),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"errors":{"Password":"{min: 8}"}}"#);
    }

    #[test]
    fn domain_error_envelope_shape() {
        let body = ErrorsBody::single("user", "wrong username or password");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"errors":{"user":"wrong username or password"}}"#);
    }
}
