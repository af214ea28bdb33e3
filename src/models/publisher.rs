//! Publisher model
//!
//! Publishers are organizations that articles can be published under.
//! A publisher records which editors and journalists work for it; the
//! membership is attribution/display metadata only and plays no part in
//! approval gating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publisher entity representing an organization that publishes articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    /// Unique identifier
    pub id: i64,
    /// Organization name (unique)
    pub name: String,
    /// Description of the publisher
    pub description: String,
    /// Publisher's website URL
    pub website: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Publisher {
    /// Create a new Publisher with the given name.
    pub fn new(name: String, description: String, website: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            name,
            description,
            website,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Role of a user within a publisher's staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Editor working for the publisher
    Editor,
    /// Journalist working for the publisher
    Journalist,
}

impl MemberRole {
    /// Convert role to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Editor => "editor",
            MemberRole::Journalist => "journalist",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "editor" => Ok(MemberRole::Editor),
            "journalist" => Ok(MemberRole::Journalist),
            _ => Err(anyhow::anyhow!("Invalid member role: {}", s)),
        }
    }
}

/// Input for creating a new publisher
#[derive(Debug, Clone)]
pub struct CreatePublisherInput {
    /// Organization name
    pub name: String,
    /// Description (optional)
    pub description: Option<String>,
    /// Website URL (optional)
    pub website: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publisher_new() {
        let publisher = Publisher::new(
            "Daily Planet".to_string(),
            "Metropolis daily".to_string(),
            "https://dailyplanet.example".to_string(),
        );

        assert_eq!(publisher.id, 0);
        assert_eq!(publisher.name, "Daily Planet");
    }

    #[test]
    fn test_member_role_round_trip() {
        assert_eq!(MemberRole::from_str("editor").unwrap(), MemberRole::Editor);
        assert_eq!(
            MemberRole::from_str("Journalist").unwrap(),
            MemberRole::Journalist
        );
        assert_eq!(MemberRole::Editor.to_string(), "editor");
        assert!(MemberRole::from_str("reader").is_err());
    }
}
