//! User accounts and auth sessions
//!
//! `User` carries the Argon2 password hash and stays inside the core layer.
//! Everything that crosses the HTTP boundary uses [`UserProfile`], which has
//! no secret material.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::map::MindMap;
use super::validation::{
    validate_email, validate_password, validate_username, ValidationError,
};

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Display/login name, unique across accounts
    pub username: String,

    /// Email address, stored lowercase, unique across accounts
    pub email: String,

    /// Argon2id PHC string. Never serialized; responses use [`UserProfile`].
    #[serde(default, skip_serializing)]
    pub password_hash: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an auto-generated UUID.
    ///
    /// The email is normalized to lowercase so uniqueness checks and login
    /// lookups are case-insensitive. `password_hash` must already be hashed;
    /// plaintext never reaches this constructor.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email: email.to_lowercase(),
            password_hash,
            created_at: now,
            modified_at: now,
        }
    }

    /// Validate structural fields (username shape, email shape, hash present)
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;

        if self.password_hash.is_empty() {
            return Err(ValidationError::MissingField("passwordHash".to_string()));
        }

        Ok(())
    }

    /// Projection safe to serialize into API responses
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// Public view of a user: everything except the password hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Parameters for creating a user (registration and admin create)
///
/// Fields default to empty strings when absent so validation can report
/// missing fields with a useful message instead of a deserialization error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Plaintext password; validated then hashed by the service
    #[serde(default)]
    pub password: String,
}

/// Login credentials
///
/// Absent fields become empty strings, which simply fail the credential
/// check; login never distinguishes missing from wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Partial user update for PATCH/PUT operations.
///
/// Only provided fields are written; both fields absent is rejected by the
/// service as an empty update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    /// Check if the update contains any changes
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

/// A user together with all maps they own
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithMaps {
    #[serde(flatten)]
    pub user: UserProfile,
    pub maps: Vec<MindMap>,
}

/// Session token lifetimes. Access tokens are short-lived working tokens;
/// refresh tokens let clients mint new access tokens without re-entering
/// credentials.
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 7;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Discriminates the two session token roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    /// Default lifetime for this kind of token
    pub fn ttl(&self) -> Duration {
        match self {
            TokenKind::Access => Duration::days(ACCESS_TOKEN_TTL_DAYS),
            TokenKind::Refresh => Duration::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }
}

impl FromStr for TokenKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(ValidationError::InvalidValue(format!(
                "unknown token kind: {}",
                other
            ))),
        }
    }
}

/// Server-side auth session. The token itself is the opaque credential the
/// client presents; there is no signed payload to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque bearer token (UUID v4), primary key
    pub token: String,

    /// Owning user
    pub user_id: String,

    /// Access or refresh
    pub kind: TokenKind,

    /// Hard expiry; expired rows are purged lazily on lookup
    pub expires_at: DateTime<Utc>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session of the given kind with its default TTL
    pub fn issue(user_id: String, kind: TokenKind) -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4().to_string(),
            user_id,
            kind,
            expires_at: now + kind.ttl(),
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Validate the raw registration/create-user input in one pass
///
/// Absent fields (deserialized to empty strings) are reported together
/// before the per-field format checks run.
pub fn validate_new_user(params: &CreateUser) -> Result<(), ValidationError> {
    if params.username.is_empty() || params.email.is_empty() || params.password.is_empty() {
        return Err(ValidationError::MissingFields(
            "username, email, password".to_string(),
        ));
    }
    validate_username(&params.username)?;
    validate_email(&params.email)?;
    validate_password(&params.password)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_normalizes_email() {
        let user = User::new(
            "alice".to_string(),
            "Alice@Example.COM".to_string(),
            "$argon2id$fake".to_string(),
        );

        assert!(!user.id.is_empty());
        assert_eq!(user.email, "alice@example.com");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_user_profile_has_no_hash() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$fake".to_string(),
        );

        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_user_serialization_skips_hash() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$fake".to_string(),
        );

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("passwordHash"));
    }

    #[test]
    fn test_user_update_is_empty() {
        assert!(UserUpdate::new().is_empty());
        assert!(!UserUpdate::new()
            .with_username("bob".to_string())
            .is_empty());
    }

    #[test]
    fn test_token_kind_round_trip() {
        assert_eq!(TokenKind::Access.as_str(), "access");
        assert_eq!("refresh".parse::<TokenKind>().unwrap(), TokenKind::Refresh);
        assert!("bearer".parse::<TokenKind>().is_err());
    }

    #[test]
    fn test_session_issue_and_expiry() {
        let session = Session::issue("user-1".to_string(), TokenKind::Access);

        assert!(!session.token.is_empty());
        assert!(!session.is_expired());
        assert!(session.expires_at > session.created_at);

        let mut expired = session.clone();
        expired.expires_at = Utc::now() - Duration::seconds(1);
        assert!(expired.is_expired());
    }

    #[test]
    fn test_refresh_outlives_access() {
        assert!(TokenKind::Refresh.ttl() > TokenKind::Access.ttl());
    }

    #[test]
    fn test_validate_new_user() {
        let good = CreateUser {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(validate_new_user(&good).is_ok());

        let short_password = CreateUser {
            password: "short".to_string(),
            ..good.clone()
        };
        assert!(validate_new_user(&short_password).is_err());
    }
}
