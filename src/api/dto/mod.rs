/*
 * Responsibility
 * - Request/response DTOs per resource
 * - Shared field validation rules
 *
 * Rules mirror the registration-era wire contract: each field reports at
 * most one failure (the first rule that trips), keyed by the capitalized
 * field name. Tags on the wire: required, alphanum, email, min, max.
 */
pub mod articles;
pub mod comments;
pub mod profiles;
pub mod users;

use crate::error::FieldError;

pub(crate) fn required(field: &'static str, value: &str) -> Option<FieldError> {
    value.is_empty().then(|| FieldError::new(field, "required"))
}

pub(crate) fn alphanum(field: &'static str, value: &str) -> Option<FieldError> {
    (!value.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| FieldError::new(field, "alphanum"))
}

pub(crate) fn min_len(field: &'static str, value: &str, min: usize) -> Option<FieldError> {
    (value.chars().count() < min).then(|| FieldError::with_param(field, "min", min))
}

pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> Option<FieldError> {
    (value.chars().count() > max).then(|| FieldError::with_param(field, "max", max))
}

pub(crate) fn email(field: &'static str, value: &str) -> Option<FieldError> {
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    (!well_formed).then(|| FieldError::new(field, "email"))
}
