//! Newsletter model
//!
//! Newsletters are curated collections of article references owned by a
//! single journalist. A newsletter may reference articles that are not
//! yet approved; what a reader gets to see of it is filtered to approved
//! articles by the newsletter service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Article;

/// Newsletter entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Newsletter {
    /// Unique identifier
    pub id: i64,
    /// Newsletter title
    pub title: String,
    /// Newsletter description
    pub description: String,
    /// Journalist who created this newsletter
    pub author_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Newsletter {
    /// Create a new Newsletter owned by the given journalist.
    pub fn new(title: String, description: String, author_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            title,
            description,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the given user owns this newsletter.
    pub fn owned_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

/// A newsletter together with the articles visible to the requesting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterView {
    /// The newsletter itself
    pub newsletter: Newsletter,
    /// Articles included, filtered per the viewer's role
    pub articles: Vec<Article>,
}

/// Input for creating a new newsletter
#[derive(Debug, Clone)]
pub struct CreateNewsletterInput {
    /// Newsletter title
    pub title: String,
    /// Newsletter description
    pub description: String,
}

/// Input for updating a newsletter
#[derive(Debug, Clone, Default)]
pub struct UpdateNewsletterInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newsletter_owned_by() {
        let newsletter = Newsletter::new("Weekly".to_string(), "Digest".to_string(), 9);
        assert!(newsletter.owned_by(9));
        assert!(!newsletter.owned_by(10));
    }
}
