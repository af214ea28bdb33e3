//! Newsletter service
//!
//! Implements business logic for newsletter curation:
//! - Creation by journalists, edits by editors or the owner
//! - Article references with natural dedup
//! - Reader-facing views filtered to approved articles
//!
//! A newsletter may reference unapproved articles at authoring time;
//! only the reader view hides them.

use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, NewsletterRepository};
use crate::models::{
    CreateNewsletterInput, Newsletter, NewsletterView, UpdateNewsletterInput, User,
};
use crate::services::authorization::{can_perform, Action};

/// Error types for newsletter service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsletterServiceError {
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

/// Newsletter service for curated article collections.
pub struct NewsletterService {
    newsletters: Arc<dyn NewsletterRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl NewsletterService {
    /// Create a new newsletter service.
    pub fn new(
        newsletters: Arc<dyn NewsletterRepository>,
        articles: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self {
            newsletters,
            articles,
        }
    }

    /// Create a newsletter owned by the acting journalist.
    pub async fn create(
        &self,
        actor: &User,
        input: CreateNewsletterInput,
    ) -> Result<Newsletter, NewsletterServiceError> {
        if !can_perform(actor, Action::CreateNewsletter) {
            return Err(NewsletterServiceError::Forbidden);
        }

        if input.title.trim().is_empty() {
            return Err(NewsletterServiceError::ValidationError(
                "Newsletter title cannot be empty".to_string(),
            ));
        }
        if input.description.trim().is_empty() {
            return Err(NewsletterServiceError::ValidationError(
                "Newsletter description cannot be empty".to_string(),
            ));
        }

        let newsletter = self.newsletters.create(actor.id, &input).await?;

        tracing::info!(
            newsletter_id = newsletter.id,
            actor_id = actor.id,
            "Newsletter created"
        );
        Ok(newsletter)
    }

    /// Edit a newsletter's title and/or description.
    pub async fn edit(
        &self,
        actor: &User,
        newsletter_id: i64,
        input: UpdateNewsletterInput,
    ) -> Result<Newsletter, NewsletterServiceError> {
        let existing = self.get_existing(newsletter_id).await?;

        if !can_perform(actor, Action::EditNewsletter(&existing)) {
            return Err(NewsletterServiceError::Forbidden);
        }

        if let Some(ref title) = input.title {
            if title.trim().is_empty() {
                return Err(NewsletterServiceError::ValidationError(
                    "Newsletter title cannot be empty".to_string(),
                ));
            }
        }

        Ok(self.newsletters.update(newsletter_id, &input).await?)
    }

    /// Delete a newsletter. The referenced articles are untouched.
    pub async fn delete(
        &self,
        actor: &User,
        newsletter_id: i64,
    ) -> Result<(), NewsletterServiceError> {
        let existing = self.get_existing(newsletter_id).await?;

        if !can_perform(actor, Action::EditNewsletter(&existing)) {
            return Err(NewsletterServiceError::Forbidden);
        }

        self.newsletters.delete(newsletter_id).await?;
        Ok(())
    }

    /// Add an article reference. Re-adding the same article is a no-op.
    pub async fn add_article(
        &self,
        actor: &User,
        newsletter_id: i64,
        article_id: i64,
    ) -> Result<(), NewsletterServiceError> {
        let existing = self.get_existing(newsletter_id).await?;

        if !can_perform(actor, Action::EditNewsletter(&existing)) {
            return Err(NewsletterServiceError::Forbidden);
        }

        if self.articles.get_by_id(article_id).await?.is_none() {
            return Err(NewsletterServiceError::NotFound(format!(
                "Article {} not found",
                article_id
            )));
        }

        self.newsletters.add_article(newsletter_id, article_id).await?;
        Ok(())
    }

    /// Remove an article reference.
    pub async fn remove_article(
        &self,
        actor: &User,
        newsletter_id: i64,
        article_id: i64,
    ) -> Result<(), NewsletterServiceError> {
        let existing = self.get_existing(newsletter_id).await?;

        if !can_perform(actor, Action::EditNewsletter(&existing)) {
            return Err(NewsletterServiceError::Forbidden);
        }

        self.newsletters
            .remove_article(newsletter_id, article_id)
            .await?;
        Ok(())
    }

    /// View a newsletter with the articles the actor may see.
    ///
    /// Editors and the owning journalist see every referenced article;
    /// everyone else sees the approved ones only.
    pub async fn view(
        &self,
        actor: &User,
        newsletter_id: i64,
    ) -> Result<NewsletterView, NewsletterServiceError> {
        let newsletter = self.get_existing(newsletter_id).await?;

        let articles = if actor.is_editor()
            || (actor.is_journalist() && newsletter.owned_by(actor.id))
        {
            self.newsletters.list_articles(newsletter_id).await?
        } else {
            self.newsletters.list_approved_articles(newsletter_id).await?
        };

        Ok(NewsletterView {
            newsletter,
            articles,
        })
    }

    /// List the newsletters owned by a journalist, newest first.
    pub async fn list_by_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<Newsletter>, NewsletterServiceError> {
        Ok(self.newsletters.list_by_author(author_id).await?)
    }

    async fn get_existing(
        &self,
        newsletter_id: i64,
    ) -> Result<Newsletter, NewsletterServiceError> {
        self.newsletters
            .get_by_id(newsletter_id)
            .await?
            .ok_or_else(|| {
                NewsletterServiceError::NotFound(format!("Newsletter {} not found", newsletter_id))
            })
    }
}
