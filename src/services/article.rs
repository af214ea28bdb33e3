//! Article service
//!
//! Implements business logic for article management:
//! - Creation with source validation (exactly one of author/publisher)
//! - Role-gated editing and deletion
//! - Visibility-gated reads
//! - Pending and approved listings
//!
//! Approval itself lives in the approval service; this one never touches
//! the approval fields. Editing approved content is allowed and needs no
//! re-approval.

use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, PublisherRepository};
use crate::models::{Article, ArticleSource, CreateArticleInput, UpdateArticleInput, User};
use crate::services::authorization::{can_perform, Action};

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Actor is not allowed to perform the operation
    #[error("Operation not permitted")]
    Forbidden,

    /// Structural validation failed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service for creating and maintaining articles.
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    publishers: Arc<dyn PublisherRepository>,
}

impl ArticleService {
    /// Create a new article service.
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        publishers: Arc<dyn PublisherRepository>,
    ) -> Self {
        Self {
            articles,
            publishers,
        }
    }

    /// Create a new article, always pending.
    ///
    /// The input must name exactly one source. An authored article must
    /// be authored by the acting journalist; publisher content may be
    /// filed by any journalist but the publisher must exist.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor is not a journalist
    /// - `ValidationError` if title or content is empty, both or neither
    ///   source is set, or the author is not the actor
    /// - `NotFound` if the referenced publisher does not exist
    pub async fn create(
        &self,
        actor: &User,
        input: CreateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        if !can_perform(actor, Action::CreateArticle) {
            return Err(ArticleServiceError::Forbidden);
        }

        validate_text(&input.title, &input.content)?;

        let source = match (input.author_id, input.publisher_id) {
            (Some(_), Some(_)) => {
                return Err(ArticleServiceError::ValidationError(
                    "Article cannot have both an author and a publisher".to_string(),
                ));
            }
            (None, None) => {
                return Err(ArticleServiceError::ValidationError(
                    "Article must have either an author or a publisher".to_string(),
                ));
            }
            (Some(author_id), None) => {
                if author_id != actor.id {
                    return Err(ArticleServiceError::ValidationError(
                        "Journalists can only author their own articles".to_string(),
                    ));
                }
                ArticleSource::Author(author_id)
            }
            (None, Some(publisher_id)) => {
                if self.publishers.get_by_id(publisher_id).await?.is_none() {
                    return Err(ArticleServiceError::NotFound(format!(
                        "Publisher {} not found",
                        publisher_id
                    )));
                }
                ArticleSource::Publisher(publisher_id)
            }
        };

        let article = self
            .articles
            .create(input.title.trim(), &input.content, source)
            .await?;

        tracing::info!(
            article_id = article.id,
            actor_id = actor.id,
            "Article created, awaiting approval"
        );

        Ok(article)
    }

    /// Edit an article's title and/or content.
    ///
    /// Allowed for editors and the authoring journalist, before and after
    /// approval. The approval fields cannot be expressed in the input and
    /// therefore never change here.
    pub async fn edit(
        &self,
        actor: &User,
        article_id: i64,
        input: UpdateArticleInput,
    ) -> Result<Article, ArticleServiceError> {
        let existing = self.get_existing(article_id).await?;

        if !can_perform(actor, Action::EditArticle(&existing)) {
            return Err(ArticleServiceError::Forbidden);
        }

        if !input.has_changes() {
            return Ok(existing);
        }

        let final_title = input.title.as_deref().unwrap_or(&existing.title);
        let final_content = input.content.as_deref().unwrap_or(&existing.content);
        validate_text(final_title, final_content)?;

        let updated = self.articles.update_content(article_id, &input).await?;
        Ok(updated)
    }

    /// Delete an article.
    ///
    /// Allowed for editors and the authoring journalist.
    pub async fn delete(&self, actor: &User, article_id: i64) -> Result<(), ArticleServiceError> {
        let existing = self.get_existing(article_id).await?;

        if !can_perform(actor, Action::DeleteArticle(&existing)) {
            return Err(ArticleServiceError::Forbidden);
        }

        self.articles.delete(article_id).await?;

        tracing::info!(article_id, actor_id = actor.id, "Article deleted");
        Ok(())
    }

    /// Fetch an article the actor is allowed to see.
    ///
    /// Approved articles are visible to everyone; pending articles only
    /// to editors and the authoring journalist.
    pub async fn view(&self, actor: &User, article_id: i64) -> Result<Article, ArticleServiceError> {
        let article = self.get_existing(article_id).await?;

        if !can_perform(actor, Action::ViewArticle(&article)) {
            return Err(ArticleServiceError::Forbidden);
        }

        Ok(article)
    }

    /// List pending articles for review, newest first. Editors only.
    pub async fn list_pending(&self, actor: &User) -> Result<Vec<Article>, ArticleServiceError> {
        if !actor.is_editor() {
            return Err(ArticleServiceError::Forbidden);
        }
        Ok(self.articles.list_pending().await?)
    }

    /// List approved articles, newest first.
    pub async fn list_approved(&self) -> Result<Vec<Article>, ArticleServiceError> {
        Ok(self.articles.list_approved().await?)
    }

    async fn get_existing(&self, article_id: i64) -> Result<Article, ArticleServiceError> {
        self.articles
            .get_by_id(article_id)
            .await?
            .ok_or_else(|| ArticleServiceError::NotFound(format!("Article {} not found", article_id)))
    }
}

/// Title and content must both be non-empty.
fn validate_text(title: &str, content: &str) -> Result<(), ArticleServiceError> {
    if title.trim().is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Article title cannot be empty".to_string(),
        ));
    }
    if content.trim().is_empty() {
        return Err(ArticleServiceError::ValidationError(
            "Article content cannot be empty".to_string(),
        ));
    }
    Ok(())
}
