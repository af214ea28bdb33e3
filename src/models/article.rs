//! Article model
//!
//! This module provides:
//! - `Article` entity with the editorial approval fields
//! - `ArticleSource` pinning each article to exactly one attribution
//! - Input types for creating and updating articles
//!
//! An article is attributed to exactly one source: either the journalist
//! who authored it independently, or a publisher it was written for.
//! The stored model makes that exclusivity unrepresentable; the create
//! input keeps the two optional references so the exclusivity rule can be
//! validated on the way in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attribution of an article: an independent journalist author or a
/// publisher, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleSource {
    /// Independent article authored by a journalist
    Author(i64),
    /// Publisher content
    Publisher(i64),
}

impl ArticleSource {
    /// The author's user ID, if this is an independent article.
    pub fn author_id(&self) -> Option<i64> {
        match self {
            ArticleSource::Author(id) => Some(*id),
            ArticleSource::Publisher(_) => None,
        }
    }

    /// The publisher's ID, if this is publisher content.
    pub fn publisher_id(&self) -> Option<i64> {
        match self {
            ArticleSource::Author(_) => None,
            ArticleSource::Publisher(id) => Some(*id),
        }
    }

    /// Role label used when presenting the source in notifications.
    pub fn role_label(&self) -> &'static str {
        match self {
            ArticleSource::Author(_) => "journalist",
            ArticleSource::Publisher(_) => "publisher",
        }
    }

    /// Reconstruct a source from the two nullable database columns.
    ///
    /// Rows violating the exclusivity rule cannot be produced by the
    /// services in this crate; encountering one means the database was
    /// modified out of band.
    pub fn from_columns(
        author_id: Option<i64>,
        publisher_id: Option<i64>,
    ) -> anyhow::Result<Self> {
        match (author_id, publisher_id) {
            (Some(author), None) => Ok(ArticleSource::Author(author)),
            (None, Some(publisher)) => Ok(ArticleSource::Publisher(publisher)),
            (Some(_), Some(_)) => Err(anyhow::anyhow!(
                "Article row has both an author and a publisher"
            )),
            (None, None) => Err(anyhow::anyhow!(
                "Article row has neither an author nor a publisher"
            )),
        }
    }
}

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Article content/body
    pub content: String,
    /// Attribution source (author or publisher)
    pub source: ArticleSource,
    /// Whether the article has been approved for publishing
    pub approved: bool,
    /// Editor who approved the article
    pub approved_by: Option<i64>,
    /// When the article was approved
    pub approved_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Check if this is an independent article (authored by a journalist).
    pub fn is_independent(&self) -> bool {
        matches!(self.source, ArticleSource::Author(_))
    }

    /// Check if this is publisher content.
    pub fn is_publisher_content(&self) -> bool {
        matches!(self.source, ArticleSource::Publisher(_))
    }

    /// Check whether the given user is the authoring journalist.
    pub fn authored_by(&self, user_id: i64) -> bool {
        self.source.author_id() == Some(user_id)
    }
}

/// Input for creating a new article.
///
/// Exactly one of `author_id` and `publisher_id` must be set; the article
/// service rejects both-set and neither-set inputs with a validation
/// error before anything is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleInput {
    /// Article title
    pub title: String,
    /// Article content/body
    pub content: String,
    /// Journalist author (for independent articles)
    pub author_id: Option<i64>,
    /// Publisher (for publisher content)
    pub publisher_id: Option<i64>,
}

impl CreateArticleInput {
    /// Create an input for an independent article.
    pub fn authored(title: String, content: String, author_id: i64) -> Self {
        Self {
            title,
            content,
            author_id: Some(author_id),
            publisher_id: None,
        }
    }

    /// Create an input for publisher content.
    pub fn for_publisher(title: String, content: String, publisher_id: i64) -> Self {
        Self {
            title,
            content,
            author_id: None,
            publisher_id: Some(publisher_id),
        }
    }
}

/// Input for updating an existing article.
///
/// Only the title and body are editable. The approval fields have no
/// representation here, so no update can touch them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New content (optional)
    pub content: Option<String>,
}

impl UpdateArticleInput {
    /// Create a new empty UpdateArticleInput
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }
}
