//! User service
//!
//! Implements business logic for user management:
//! - Registration with Argon2 password hashing
//! - Credential verification
//! - Activation toggling
//! - Role changes guarded by the subscription invariant: only readers
//!   own subscription edges, so a reader with edges cannot switch role
//!   until the edges are gone.

use std::sync::Arc;

use crate::db::repositories::{SubscriptionRepository, UserRepository};
use crate::models::{CreateUserInput, User, UserRole};
use crate::services::password::{hash_password, verify_password};

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Referenced user absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for registration and account management.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    /// Register a new user. The role defaults to Reader.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username, email, or password is empty
    /// - `UserExists` if username or email is already taken
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        let username = input.username.trim();
        let email = input.email.trim();

        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        if self.users.exists_by_username(username).await? {
            return Err(UserServiceError::UserExists(username.to_string()));
        }
        if self.users.exists_by_email(email).await? {
            return Err(UserServiceError::UserExists(email.to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let mut user = User::new(
            username.to_string(),
            email.to_string(),
            password_hash,
            input.role.unwrap_or_default(),
        );
        user.display_name = input.display_name;

        let created = self.users.create(&user).await?;

        tracing::info!(
            user_id = created.id,
            role = %created.role,
            "User registered"
        );
        Ok(created)
    }

    /// Fetch a user by ID.
    pub async fn get(&self, id: i64) -> Result<User, UserServiceError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(format!("User {} not found", id)))
    }

    /// Verify a username/password pair, returning the user on success.
    ///
    /// Inactive accounts fail verification regardless of the password.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserServiceError> {
        let user = match self.users.get_by_username(username).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        if !user.is_active {
            return Ok(None);
        }

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Change a user's role.
    ///
    /// A user holding subscription edges can only be a reader; the edges
    /// must be removed before the role can change.
    pub async fn change_role(&self, id: i64, role: UserRole) -> Result<(), UserServiceError> {
        let user = self.get(id).await?;

        if user.role == role {
            return Ok(());
        }

        if role != UserRole::Reader && self.subscriptions.has_any(id).await? {
            return Err(UserServiceError::ValidationError(
                "Only readers can have subscriptions; remove them first".to_string(),
            ));
        }

        self.users.update_role(id, role).await?;
        tracing::info!(user_id = id, role = %role, "User role changed");
        Ok(())
    }

    /// Activate or deactivate an account. Inactive readers drop out of
    /// notification fan-out immediately.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<(), UserServiceError> {
        // Ensure the user exists first
        self.get(id).await?;
        self.users.set_active(id, active).await?;
        Ok(())
    }
}
