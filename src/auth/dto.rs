use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::repo_types::UserSummary;
use crate::error::{AppError, AppResult};

const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        if !is_valid_email(&self.email) {
            return Err(AppError::validation("invalid email"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::validation("first_name and last_name are required"));
        }
        Ok(())
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::validation("email and password are required"));
        }
        Ok(())
    }
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("Jane.Doe+tag@sub.example.org"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn register_requires_six_char_password() {
        assert!(register("jane@example.com", "12345").validate().is_err());
        assert!(register("jane@example.com", "123456").validate().is_ok());
    }

    #[test]
    fn register_requires_names() {
        let mut req = register("jane@example.com", "secret1");
        req.last_name = "  ".into();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn login_requires_both_fields() {
        let req = LoginRequest {
            email: "jane@example.com".into(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
