//! Form field validation.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Password,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
        }
    }

    /// Validate `value` as this field.
    pub fn validate(self, value: &str) -> Result<(), FieldError> {
        match self {
            Self::Email => validate_email(value),
            Self::Password => validate_password(value),
        }
    }
}

/// Message shown under a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    EmailInvalid,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,

    /// Shown under the email field when login and registration both failed.
    #[error("Registration failed. Please try again.")]
    RegistrationFailed,
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::EmailRequired);
    }
    if !EMAIL.is_match(email) {
        return Err(FieldError::EmailInvalid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FieldError::PasswordTooShort);
    }
    Ok(())
}
