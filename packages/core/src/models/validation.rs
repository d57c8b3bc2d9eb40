//! Field validation shared by all models
//!
//! Validation runs in the service layer before anything touches the database,
//! so the rules live next to the models rather than inside SQL constraints.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

// Usernames are URL- and mention-safe: letters, digits, underscore
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_]+$";

// Structural email check only. Deliverability is not our problem;
// we just reject strings that cannot possibly be an address.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 100;
pub const TEXT_MAX_LEN: usize = 255;

/// Validation errors for model fields
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Several required fields absent at once, listed comma-separated
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Validate a username: 3-50 chars, letters/digits/underscore only
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::MissingField("username".to_string()));
    }

    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(ValidationError::InvalidUsername(format!(
            "must be {}-{} characters, got {}",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN, len
        )));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let username_regex = USERNAME_REGEX.get_or_init(|| Regex::new(USERNAME_PATTERN).unwrap());

    if !username_regex.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "only letters, digits and underscores are allowed".to_string(),
        ));
    }

    Ok(())
}

/// Validate an email address shape (not deliverability)
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("email".to_string()));
    }

    if email.len() > TEXT_MAX_LEN {
        return Err(ValidationError::InvalidEmail(format!(
            "must be at most {} characters",
            TEXT_MAX_LEN
        )));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let email_regex = EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).unwrap());

    if !email_regex.is_match(email) {
        return Err(ValidationError::InvalidEmail(format!(
            "not a valid address: {}",
            email
        )));
    }

    Ok(())
}

/// Validate a plaintext password before hashing
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(ValidationError::InvalidPassword(format!(
            "must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(ValidationError::InvalidPassword(format!(
            "must be at most {} characters",
            PASSWORD_MAX_LEN
        )));
    }
    Ok(())
}

/// Validate a map title: non-blank, at most 255 chars
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::InvalidTitle(
            "must not be blank".to_string(),
        ));
    }
    if title.chars().count() > TEXT_MAX_LEN {
        return Err(ValidationError::InvalidTitle(format!(
            "must be at most {} characters",
            TEXT_MAX_LEN
        )));
    }
    Ok(())
}

/// Validate a node label: non-blank, at most 255 chars
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        return Err(ValidationError::InvalidLabel(
            "must not be blank".to_string(),
        ));
    }
    if label.chars().count() > TEXT_MAX_LEN {
        return Err(ValidationError::InvalidLabel(format!(
            "must be at most {} characters",
            TEXT_MAX_LEN
        )));
    }
    Ok(())
}

/// Validate node coordinates. NaN and infinities would poison layout math
/// and break JSON serialization, so they are rejected at the edge.
pub fn validate_position(pos_x: f64, pos_y: f64) -> Result<(), ValidationError> {
    if !pos_x.is_finite() || !pos_y.is_finite() {
        return Err(ValidationError::InvalidPosition(format!(
            "coordinates must be finite numbers, got ({}, {})",
            pos_x, pos_y
        )));
    }
    Ok(())
}
