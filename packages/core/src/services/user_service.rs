//! User Service - Account CRUD Operations
//!
//! Business logic for user accounts: creation, lookup, listing, profile
//! updates, and deletion. Account creation shares its validation and
//! password hashing with `AuthService::register`; token issuance stays
//! over there.

use crate::db::MindmapStore;
use crate::models::{
    validate_email, validate_username, CreateUser, User, UserUpdate, UserWithMaps,
};
use crate::services::auth_service::create_account;
use crate::services::error::ServiceError;
use std::sync::Arc;

/// Core service for user account operations
#[derive(Clone)]
pub struct UserService {
    /// Store for all persistence operations
    store: Arc<dyn MindmapStore>,
}

impl UserService {
    /// Create a new UserService backed by the given store
    pub fn new(store: Arc<dyn MindmapStore>) -> Self {
        Self { store }
    }

    /// Create a user account directly, without issuing any sessions
    ///
    /// Same validation, uniqueness checks, and password hashing as
    /// registration; callers log in afterwards if they want tokens.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if username, email, or password are malformed
    /// - `DuplicateEmail` / `DuplicateUsername` if already taken
    pub async fn create_user(&self, params: CreateUser) -> Result<User, ServiceError> {
        let user = create_account(&self.store, params).await?;

        tracing::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// `UserNotFound` if no such user exists
    pub async fn get_user(&self, id: &str) -> Result<User, ServiceError> {
        self.store
            .get_user(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or_else(|| ServiceError::user_not_found(id))
    }

    /// List all users ordered by creation time
    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        self.store
            .list_users()
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Get a user together with all their maps
    pub async fn get_user_with_maps(&self, id: &str) -> Result<UserWithMaps, ServiceError> {
        let user = self.get_user(id).await?;
        let maps = self
            .store
            .list_maps_by_user(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        Ok(UserWithMaps {
            user: user.profile(),
            maps,
        })
    }

    /// Apply a partial update to a user, returning the number of rows
    /// affected
    ///
    /// Only username and email can change here; passwords go through
    /// `AuthService`.
    ///
    /// # Errors
    ///
    /// - `InvalidUpdate` if no fields are provided
    /// - `UserNotFound` if no such user exists
    /// - `ValidationFailed` for a malformed username or email
    /// - `DuplicateEmail` / `DuplicateUsername` if the new value belongs to
    ///   another user
    pub async fn update_user(&self, id: &str, update: UserUpdate) -> Result<u64, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::invalid_update(
                "No fields provided for update",
            ));
        }

        let current = self.get_user(id).await?;

        let username = match update.username {
            Some(username) => {
                validate_username(&username)?;
                username
            }
            None => current.username.clone(),
        };

        let email = match update.email {
            Some(email) => {
                validate_email(&email)?;
                email.to_lowercase()
            }
            None => current.email.clone(),
        };

        // Uniqueness checks only when the value actually changes
        if email != current.email {
            let taken = self
                .store
                .get_user_by_email(&email)
                .await
                .map_err(|e| ServiceError::query_failed(e.to_string()))?;
            if taken.is_some() {
                return Err(ServiceError::DuplicateEmail);
            }
        }

        if username != current.username {
            let taken = self
                .store
                .get_user_by_username(&username)
                .await
                .map_err(|e| ServiceError::query_failed(e.to_string()))?;
            if taken.is_some() {
                return Err(ServiceError::DuplicateUsername);
            }
        }

        self.store
            .update_user(id, &username, &email)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Delete a user and everything they own (sessions, maps, nodes)
    ///
    /// # Errors
    ///
    /// `UserNotFound` if no such user exists
    pub async fn delete_user(&self, id: &str) -> Result<u64, ServiceError> {
        let deleted = self
            .store
            .delete_user(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        if deleted == 0 {
            return Err(ServiceError::user_not_found(id));
        }

        tracing::info!("Deleted user {}", id);
        Ok(deleted)
    }
}
