//! Approval state machine
//!
//! Owns the only writes that move an article out of the pending state:
//! `approve` (pending to approved, exactly once) and `reject` (pending to
//! deleted, irrevocably). Approval is an explicit command; nothing in
//! this crate infers the transition from field diffs. The notification
//! event is emitted strictly after the repository write commits, so a
//! transition that failed to persist can never notify anyone.

use std::sync::Arc;

use crate::db::repositories::ArticleRepository;
use crate::models::{Article, User};
use crate::services::authorization::{can_perform, Action};
use crate::services::clock::Clock;
use crate::services::notification::{ArticleApproved, NotificationService};

/// Error types for approval operations
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// Actor is not allowed to perform the transition
    #[error("Operation not permitted")]
    Forbidden,

    /// Article does not exist
    #[error("Article not found: {0}")]
    NotFound(i64),

    /// The article is already approved. Surfaced as a warning by
    /// callers, not as a hard failure.
    #[error("Article is already approved")]
    AlreadyApproved,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Service owning the article approval transitions.
pub struct ApprovalService {
    articles: Arc<dyn ArticleRepository>,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<NotificationService>>,
}

impl ApprovalService {
    /// Create an approval service without a notifier (no fan-out).
    pub fn new(articles: Arc<dyn ArticleRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            articles,
            clock,
            notifier: None,
        }
    }

    /// Create an approval service that dispatches `ArticleApproved`
    /// events to the given notifier after each successful transition.
    pub fn with_notifier(
        articles: Arc<dyn ArticleRepository>,
        clock: Arc<dyn Clock>,
        notifier: Arc<NotificationService>,
    ) -> Self {
        Self {
            articles,
            clock,
            notifier: Some(notifier),
        }
    }

    /// Approve a pending article.
    ///
    /// Sets `approved`, `approved_by`, and `approved_at`, then emits one
    /// `ArticleApproved` event. The repository write is a guarded update,
    /// so of two concurrent approvers exactly one succeeds; the other
    /// gets `AlreadyApproved` and no second event fires.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor is not an editor
    /// - `NotFound` if the article does not exist
    /// - `AlreadyApproved` if the article was approved before this call
    pub async fn approve(&self, article_id: i64, editor: &User) -> Result<Article, ApprovalError> {
        if !can_perform(editor, Action::ApproveArticle) {
            return Err(ApprovalError::Forbidden);
        }

        let article = self
            .articles
            .get_by_id(article_id)
            .await?
            .ok_or(ApprovalError::NotFound(article_id))?;

        if article.approved {
            return Err(ApprovalError::AlreadyApproved);
        }

        let now = self.clock.now();
        let transitioned = self.articles.approve(article_id, editor.id, now).await?;
        if !transitioned {
            // A concurrent approver won the guarded update
            return Err(ApprovalError::AlreadyApproved);
        }

        let approved = Article {
            approved: true,
            approved_by: Some(editor.id),
            approved_at: Some(now),
            updated_at: now,
            ..article
        };

        tracing::info!(
            article_id = approved.id,
            editor_id = editor.id,
            "Article approved"
        );

        if let Some(notifier) = &self.notifier {
            notifier
                .dispatch(&ArticleApproved {
                    article: approved.clone(),
                    approved_by: editor.id,
                    approved_at: now,
                })
                .await;
        }

        Ok(approved)
    }

    /// Reject a pending article by deleting it.
    ///
    /// Rejection is terminal: the record is removed, nothing is kept, and
    /// no event is emitted.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor is not an editor
    /// - `NotFound` if the article does not exist
    /// - `AlreadyApproved` if the article has left the pending state
    pub async fn reject(&self, article_id: i64, editor: &User) -> Result<(), ApprovalError> {
        if !can_perform(editor, Action::ApproveArticle) {
            return Err(ApprovalError::Forbidden);
        }

        let article = self
            .articles
            .get_by_id(article_id)
            .await?
            .ok_or(ApprovalError::NotFound(article_id))?;

        if article.approved {
            return Err(ApprovalError::AlreadyApproved);
        }

        self.articles.delete(article_id).await?;

        tracing::info!(
            article_id = article.id,
            editor_id = editor.id,
            "Article rejected and deleted"
        );

        Ok(())
    }
}
