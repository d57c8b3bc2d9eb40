//! Authentication Service
//!
//! Registration, login, and session management:
//!
//! - Passwords hashed with Argon2id (PHC string format, per-user salt)
//! - Opaque UUID session tokens stored server side, one row per token
//! - Short-lived access tokens plus long-lived refresh tokens
//! - Expired sessions swept lazily on login and refresh
//!
//! Tokens carry no claims; every request resolves the token against the
//! sessions table, so revocation (logout, user deletion) takes effect
//! immediately.

use crate::db::MindmapStore;
use crate::models::{validate_new_user, CreateUser, Credentials, Session, TokenKind, User};
use crate::services::error::ServiceError;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use std::sync::Arc;

/// Outcome of a successful registration or login
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access: Session,
    pub refresh: Session,
}

/// Hash a password with Argon2id and a fresh random salt
///
/// Returns the full PHC string (`$argon2id$v=19$...`), which embeds the
/// algorithm parameters and salt needed for verification.
fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::password_hash_failed(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash string
///
/// A wrong password returns `Ok(false)`; only a malformed stored hash is an
/// error.
fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ServiceError::password_hash_failed(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Validate registration input, enforce uniqueness, hash the password, and
/// insert the account row
///
/// Shared between `AuthService::register` and `UserService::create_user`;
/// only the former issues sessions afterwards.
pub(crate) async fn create_account(
    store: &Arc<dyn MindmapStore>,
    params: CreateUser,
) -> Result<User, ServiceError> {
    validate_new_user(&params)?;

    let email = params.email.to_lowercase();

    let existing = store
        .get_user_by_email(&email)
        .await
        .map_err(|e| ServiceError::query_failed(e.to_string()))?;
    if existing.is_some() {
        return Err(ServiceError::DuplicateEmail);
    }

    let existing = store
        .get_user_by_username(&params.username)
        .await
        .map_err(|e| ServiceError::query_failed(e.to_string()))?;
    if existing.is_some() {
        return Err(ServiceError::DuplicateUsername);
    }

    let password_hash = hash_password(&params.password)?;
    store
        .create_user(User::new(params.username, email, password_hash))
        .await
        .map_err(|e| ServiceError::query_failed(e.to_string()))
}

/// Core service for authentication and session lifecycle
///
/// # Examples
///
/// ```no_run
/// use mindmapper_core::db::{DatabaseService, TursoStore};
/// use mindmapper_core::models::CreateUser;
/// use mindmapper_core::services::AuthService;
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/test.db")).await?);
///     let service = AuthService::new(Arc::new(TursoStore::new(db)));
///
///     let registered = service
///         .register(CreateUser {
///             username: "alice".to_string(),
///             email: "alice@example.com".to_string(),
///             password: "correct horse battery".to_string(),
///         })
///         .await?;
///     println!("access token: {}", registered.access.token);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct AuthService {
    /// Store for all persistence operations
    store: Arc<dyn MindmapStore>,
}

impl AuthService {
    /// Create a new AuthService backed by the given store
    pub fn new(store: Arc<dyn MindmapStore>) -> Self {
        Self { store }
    }

    /// Register a new user and issue an access/refresh token pair
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if username, email, or password are malformed
    /// - `DuplicateEmail` / `DuplicateUsername` if already taken
    pub async fn register(&self, params: CreateUser) -> Result<AuthSession, ServiceError> {
        let user = create_account(&self.store, params).await?;

        let (access, refresh) = self.issue_sessions(&user.id).await?;

        tracing::info!("Registered user {} ({})", user.username, user.id);

        Ok(AuthSession {
            user,
            access,
            refresh,
        })
    }

    /// Log a user in with email and password
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or a wrong password; the
    /// two cases are deliberately indistinguishable.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession, ServiceError> {
        self.purge_expired().await;

        let email = credentials.email.to_lowercase();
        let user = self
            .store
            .get_user_by_email(&email)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(&credentials.password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let (access, refresh) = self.issue_sessions(&user.id).await?;

        Ok(AuthSession {
            user,
            access,
            refresh,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is not rotated; it stays valid until its own
    /// expiry.
    ///
    /// # Errors
    ///
    /// - `InvalidRefreshToken` if the token is unknown, expired, or an
    ///   access token was presented
    /// - `UserNotFound` if the account was deleted since the token was issued
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, ServiceError> {
        self.purge_expired().await;

        let session = self
            .store
            .get_session(refresh_token)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or(ServiceError::InvalidRefreshToken)?;

        if session.kind != TokenKind::Refresh || session.is_expired() {
            return Err(ServiceError::InvalidRefreshToken);
        }

        let user = self
            .store
            .get_user(&session.user_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or_else(|| ServiceError::user_not_found(&session.user_id))?;

        self.store
            .create_session(Session::issue(user.id.clone(), TokenKind::Access))
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Resolve an access token to its user
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the token is unknown, expired, of the wrong kind,
    /// or its user no longer exists. Callers get no more detail than that.
    pub async fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        let session = self
            .store
            .get_session(token)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or(ServiceError::Unauthorized)?;

        if session.kind != TokenKind::Access || session.is_expired() {
            return Err(ServiceError::Unauthorized);
        }

        self.store
            .get_user(&session.user_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or(ServiceError::Unauthorized)
    }

    /// Revoke a session token
    ///
    /// Idempotent: revoking an unknown token succeeds with a count of 0.
    pub async fn logout(&self, token: &str) -> Result<u64, ServiceError> {
        self.store
            .delete_session(token)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Issue and persist a fresh access/refresh pair
    async fn issue_sessions(&self, user_id: &str) -> Result<(Session, Session), ServiceError> {
        let access = self
            .store
            .create_session(Session::issue(user_id.to_string(), TokenKind::Access))
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        let refresh = self
            .store
            .create_session(Session::issue(user_id.to_string(), TokenKind::Refresh))
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        Ok((access, refresh))
    }

    /// Best-effort sweep of expired sessions. Auth decisions never depend on
    /// it; `Session::is_expired` is always checked in-process.
    async fn purge_expired(&self) {
        match self.store.purge_expired_sessions().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("Purged {} expired sessions", purged),
            Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
        }
    }
}
