//! User model
//!
//! This module defines the User entity and the role enum that drives
//! authorization throughout the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered user in the system.
///
/// Every user carries exactly one role (Reader, Editor, or Journalist)
/// which determines what they can do. Readers additionally own
/// subscription edges to journalists and publishers; those edges live in
/// their own tables and are managed by the subscription service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Optional display name, preferred over the username for attribution
    pub display_name: Option<String>,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Whether the account is active; inactive readers receive no notifications
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this
    /// function. Use `services::password::hash_password()` to hash it.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            display_name: None,
            password_hash,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user has the Reader role
    pub fn is_reader(&self) -> bool {
        self.role == UserRole::Reader
    }

    /// Check if the user has the Editor role
    pub fn is_editor(&self) -> bool {
        self.role == UserRole::Editor
    }

    /// Check if the user has the Journalist role
    pub fn is_journalist(&self) -> bool {
        self.role == UserRole::Journalist
    }

    /// Name used when attributing content to this user.
    ///
    /// Falls back to the username when no display name is set.
    pub fn attribution_name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

/// User role for authorization.
///
/// Roles determine what actions a user can perform:
/// - Reader: views approved content, owns subscriptions
/// - Editor: reviews, approves, and rejects articles
/// - Journalist: creates and maintains articles and newsletters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Reader - consumes approved content
    Reader,
    /// Editor - owns the approval workflow
    Editor,
    /// Journalist - authors content
    Journalist,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Reader
    }
}

impl UserRole {
    /// Convert role to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Reader => "reader",
            UserRole::Editor => "editor",
            UserRole::Journalist => "journalist",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reader" => Ok(UserRole::Reader),
            "editor" => Ok(UserRole::Editor),
            "journalist" => Ok(UserRole::Journalist),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// User role (optional, defaults to Reader)
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(role: UserRole) -> User {
        User::new(
            "testuser".to_string(),
            "test@example.com".to_string(),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn test_user_new() {
        let user = make_user(UserRole::Journalist);

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "testuser");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, UserRole::Journalist);
        assert!(user.is_active);
    }

    #[test]
    fn test_role_predicates() {
        assert!(make_user(UserRole::Reader).is_reader());
        assert!(make_user(UserRole::Editor).is_editor());
        assert!(make_user(UserRole::Journalist).is_journalist());
        assert!(!make_user(UserRole::Reader).is_editor());
        assert!(!make_user(UserRole::Editor).is_journalist());
    }

    #[test]
    fn test_attribution_name_prefers_display_name() {
        let mut user = make_user(UserRole::Journalist);
        assert_eq!(user.attribution_name(), "testuser");

        user.display_name = Some("Jane Doe".to_string());
        assert_eq!(user.attribution_name(), "Jane Doe");
    }

    #[test]
    fn test_attribution_name_ignores_blank_display_name() {
        let mut user = make_user(UserRole::Journalist);
        user.display_name = Some("   ".to_string());
        assert_eq!(user.attribution_name(), "testuser");
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Reader.to_string(), "reader");
        assert_eq!(UserRole::Editor.to_string(), "editor");
        assert_eq!(UserRole::Journalist.to_string(), "journalist");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("reader").unwrap(), UserRole::Reader);
        assert_eq!(UserRole::from_str("EDITOR").unwrap(), UserRole::Editor);
        assert_eq!(
            UserRole::from_str("Journalist").unwrap(),
            UserRole::Journalist
        );
        assert!(UserRole::from_str("admin").is_err());
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::Reader);
    }
}
