/*
 * Responsibility
 * - User registration / login / update DTOs and the user response view
 */
use serde::{Deserialize, Serialize};

use crate::api::dto::{alphanum, email, max_len, min_len, required};
use crate::error::{AppError, FieldError};
use crate::repos::user_repo::UserRow;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user: RegisterUser,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let user = &self.user;
        let mut failures: Vec<FieldError> = Vec::new();

        if let Some(f) = required("Username", &user.username)
            .or_else(|| alphanum("Username", &user.username))
            .or_else(|| min_len("Username", &user.username, 4))
            .or_else(|| max_len("Username", &user.username, 255))
        {
            failures.push(f);
        }
        if let Some(f) = required("Email", &user.email).or_else(|| email("Email", &user.email)) {
            failures.push(f);
        }
        if let Some(f) = required("Password", &user.password)
            .or_else(|| min_len("Password", &user.password, 8))
            .or_else(|| max_len("Password", &user.password, 255))
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

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user: LoginUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let user = &self.user;
        let mut failures: Vec<FieldError> = Vec::new();

        if let Some(f) = required("Email", &user.email).or_else(|| email("Email", &user.email)) {
            failures.push(f);
        }
        if let Some(f) = required("Password", &user.password)
            .or_else(|| min_len("Password", &user.password, 8))
            .or_else(|| max_len("Password", &user.password, 255))
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

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user: UpdateUser,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (clear the image)
    // - Some(Some(v)): set value
    pub image: Option<Option<String>>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let user = &self.user;
        let mut failures: Vec<FieldError> = Vec::new();

        if let Some(username) = &user.username
            && let Some(f) = required("Username", username)
                .or_else(|| alphanum("Username", username))
                .or_else(|| min_len("Username", username, 4))
                .or_else(|| max_len("Username", username, 255))
        {
            failures.push(f);
        }
        if let Some(value) = &user.email
            && let Some(f) = required("Email", value).or_else(|| email("Email", value))
        {
            failures.push(f);
        }
        if let Some(password) = &user.password
            && let Some(f) = required("Password", password)
                .or_else(|| min_len("Password", password, 8))
                .or_else(|| max_len("Password", password, 255))
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
pub struct UserBody {
    pub user: UserView,
}

/// The authenticated user as returned by register/login/current-user.
/// Always carries a freshly issued token.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub image: Option<String>,
    pub token: String,
}

impl UserView {
    pub fn from_row(row: UserRow, token: String) -> Self {
        Self {
            username: row.username,
            email: row.email,
            bio: row.bio,
            image: row.image,
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            user: RegisterUser {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            },
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(register("wangzitian0", "w@example.com", "0123456789")
            .validate()
            .is_ok());
    }

    #[test]
    fn short_password_reports_min_with_param() {
        let err = register("wangzitian0", "w@example.com", "0122")
            .validate()
            .unwrap_err();
        match err {
            AppError::Validation(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].field, "Password");
                assert_eq!(failures[0].tag, "min");
                assert_eq!(failures[0].param.as_deref(), Some("8"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn non_alphanum_username_reports_alphanum() {
        let err = register("_wangzitian0", "w@example.com", "0123456789")
            .validate()
            .unwrap_err();
        match err {
            AppError::Validation(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].field, "Username");
                assert_eq!(failures[0].tag, "alphanum");
                assert_eq!(failures[0].param, None);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn every_failing_field_is_reported_in_one_pass() {
        let err = register("", "nope", "short").validate().unwrap_err();
        match err {
            AppError::Validation(failures) => {
                let fields: Vec<_> = failures.iter().map(|f| f.field).collect();
                assert_eq!(fields, vec!["Username", "Email", "Password"]);
                // first tripped rule per field
                assert_eq!(failures[0].tag, "required");
                assert_eq!(failures[1].tag, "email");
                assert_eq!(failures[2].tag, "min");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_validates_only_provided_fields() {
        let req = UpdateUserRequest {
            user: UpdateUser {
                username: None,
                email: None,
                password: None,
                bio: Some("whatever".to_string()),
                image: Some(None),
            },
        };
        assert!(req.validate().is_ok());

        let req = UpdateUserRequest {
            user: UpdateUser {
                username: Some("ab".to_string()),
                email: None,
                password: None,
                bio: None,
                image: None,
            },
        };
        assert!(req.validate().is_err());
    }
}
