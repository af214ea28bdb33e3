//! Subscription service
//!
//! Maintains the reader subscription edges and answers the two queries
//! built on them: who subscribes to a source, and what a reader's feed
//! contains. The feed is computed live on every call; the dataset does
//! not warrant a cache and a feed must always reflect the current
//! approval and subscription state.

use std::sync::Arc;

use crate::db::repositories::{
    ArticleRepository, PublisherRepository, SubscriptionRepository, UserRepository,
};
use crate::models::{Article, SubscriptionTarget, User};

/// Error types for subscription operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionServiceError {
    /// Only readers own subscriptions
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Journalist-subscription target is not a journalist
    #[error("Invalid subscription target: {0}")]
    InvalidTarget(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Service managing reader subscriptions and the subscribed feed.
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
    publishers: Arc<dyn PublisherRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl SubscriptionService {
    /// Create a new subscription service.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
        publishers: Arc<dyn PublisherRepository>,
        articles: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self {
            subscriptions,
            users,
            publishers,
            articles,
        }
    }

    /// Subscribe a reader to a target. Subscribing twice is a no-op.
    pub async fn subscribe(
        &self,
        reader: &User,
        target: SubscriptionTarget,
    ) -> Result<(), SubscriptionServiceError> {
        self.validate_reader(reader)?;
        self.validate_target(target).await?;
        self.subscriptions.add(reader.id, target).await?;

        tracing::debug!(reader_id = reader.id, ?target, "Subscribed");
        Ok(())
    }

    /// Remove a subscription edge. Removing an absent edge is a no-op.
    pub async fn unsubscribe(
        &self,
        reader: &User,
        target: SubscriptionTarget,
    ) -> Result<(), SubscriptionServiceError> {
        self.validate_reader(reader)?;
        self.validate_target(target).await?;
        self.subscriptions.remove(reader.id, target).await?;

        tracing::debug!(reader_id = reader.id, ?target, "Unsubscribed");
        Ok(())
    }

    /// Check whether the reader is subscribed to the target.
    pub async fn is_subscribed(
        &self,
        reader: &User,
        target: SubscriptionTarget,
    ) -> Result<bool, SubscriptionServiceError> {
        self.validate_reader(reader)?;
        Ok(self.subscriptions.exists(reader.id, target).await?)
    }

    /// Flip the subscription edge, returning the new state
    /// (`true` = now subscribed).
    pub async fn toggle(
        &self,
        reader: &User,
        target: SubscriptionTarget,
    ) -> Result<bool, SubscriptionServiceError> {
        self.validate_reader(reader)?;
        self.validate_target(target).await?;

        if self.subscriptions.exists(reader.id, target).await? {
            self.subscriptions.remove(reader.id, target).await?;
            Ok(false)
        } else {
            self.subscriptions.add(reader.id, target).await?;
            Ok(true)
        }
    }

    /// All active readers subscribed to the given source.
    pub async fn subscribers_of(
        &self,
        target: SubscriptionTarget,
    ) -> Result<Vec<User>, SubscriptionServiceError> {
        Ok(self.subscriptions.subscribers_of(target).await?)
    }

    /// The reader's feed: approved articles from subscribed sources,
    /// newest first. Computed live per call.
    pub async fn feed_for(&self, reader: &User) -> Result<Vec<Article>, SubscriptionServiceError> {
        self.validate_reader(reader)?;
        Ok(self.articles.list_feed(reader.id).await?)
    }

    /// Subscriptions belong to readers; any other role holds none.
    fn validate_reader(&self, actor: &User) -> Result<(), SubscriptionServiceError> {
        if !actor.is_reader() {
            return Err(SubscriptionServiceError::ValidationError(
                "Only readers have subscriptions".to_string(),
            ));
        }
        Ok(())
    }

    /// Journalist targets must exist and hold the journalist role;
    /// publisher targets must exist.
    async fn validate_target(
        &self,
        target: SubscriptionTarget,
    ) -> Result<(), SubscriptionServiceError> {
        match target {
            SubscriptionTarget::Journalist(id) => {
                let user = self
                    .users
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| SubscriptionServiceError::NotFound(format!(
                        "User {} not found",
                        id
                    )))?;
                if !user.is_journalist() {
                    return Err(SubscriptionServiceError::InvalidTarget(format!(
                        "User {} is not a journalist",
                        id
                    )));
                }
            }
            SubscriptionTarget::Publisher(id) => {
                if self.publishers.get_by_id(id).await?.is_none() {
                    return Err(SubscriptionServiceError::NotFound(format!(
                        "Publisher {} not found",
                        id
                    )));
                }
            }
        }
        Ok(())
    }
}
