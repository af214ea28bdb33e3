//! Notification fan-out
//!
//! Consumes `ArticleApproved` events and dispatches them to the email and
//! social-post channels. The two channels are independent: each failure
//! is caught and logged, and neither can affect the other or the already
//! committed approval. Creation and content edits never reach this
//! module; only the approval transition produces an event.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::SocialConfig;
use crate::db::repositories::{PublisherRepository, SubscriptionRepository, UserRepository};
use crate::models::{Article, ArticleSource, SubscriptionTarget, User};
use crate::services::email::EmailSender;
use crate::services::social::SocialPoster;

/// Maximum characters of article content quoted in a notification email
const EMAIL_EXCERPT_CHARS: usize = 200;

/// Maximum characters in a social post
const POST_MAX_CHARS: usize = 250;

/// A content excerpt is only added to a post when at least this many
/// characters remain after title and byline
const POST_EXCERPT_FLOOR: usize = 50;

/// Event emitted by the approval machine after a successful commit.
#[derive(Debug, Clone)]
pub struct ArticleApproved {
    /// The article, as of the transition
    pub article: Article,
    /// Editor who performed the approval
    pub approved_by: i64,
    /// When the transition was committed
    pub approved_at: DateTime<Utc>,
}

/// Per-channel failure. Always logged by the fan-out, never returned to
/// the approval caller.
#[derive(Debug, thiserror::Error)]
pub enum NotificationChannelError {
    /// Email channel failed
    #[error("Email channel failed: {0}")]
    Email(#[source] anyhow::Error),

    /// Social-post channel failed
    #[error("Social channel failed: {0}")]
    Social(#[source] anyhow::Error),
}

/// Fan-out dispatcher for approval events.
pub struct NotificationService {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
    publishers: Arc<dyn PublisherRepository>,
    email: Arc<dyn EmailSender>,
    social: Arc<dyn SocialPoster>,
    social_config: SocialConfig,
}

impl NotificationService {
    /// Create a new notification service.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
        publishers: Arc<dyn PublisherRepository>,
        email: Arc<dyn EmailSender>,
        social: Arc<dyn SocialPoster>,
        social_config: SocialConfig,
    ) -> Self {
        Self {
            subscriptions,
            users,
            publishers,
            email,
            social,
            social_config,
        }
    }

    /// Dispatch an approval event to both channels.
    ///
    /// The approval this event describes is already durable, so nothing
    /// here may fail the caller. Channel errors are logged and swallowed.
    pub async fn dispatch(&self, event: &ArticleApproved) {
        let article = &event.article;

        let (source_name, role_label) = match self.resolve_source(article).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!(
                    article_id = article.id,
                    error = %e,
                    "Could not resolve article source; skipping notifications"
                );
                return;
            }
        };

        let target = match article.source {
            ArticleSource::Author(id) => SubscriptionTarget::Journalist(id),
            ArticleSource::Publisher(id) => SubscriptionTarget::Publisher(id),
        };

        let subscribers = match self.subscriptions.subscribers_of(target).await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                tracing::error!(
                    article_id = article.id,
                    error = %e,
                    "Could not load subscribers; skipping notifications"
                );
                return;
            }
        };

        if let Err(e) = self
            .send_email(article, &source_name, role_label, &subscribers)
            .await
        {
            let err = NotificationChannelError::Email(e);
            tracing::error!(article_id = article.id, error = %err, "Notification channel failed");
        }

        if let Err(e) = self.post_social(article, &source_name).await {
            let err = NotificationChannelError::Social(e);
            tracing::error!(article_id = article.id, error = %err, "Notification channel failed");
        }
    }

    /// Resolve the display name and role label of the article's source.
    async fn resolve_source(&self, article: &Article) -> Result<(String, &'static str)> {
        match article.source {
            ArticleSource::Author(id) => {
                let author = self
                    .users
                    .get_by_id(id)
                    .await?
                    .with_context(|| format!("Author {} not found", id))?;
                Ok((author.attribution_name().to_string(), "journalist"))
            }
            ArticleSource::Publisher(id) => {
                let publisher = self
                    .publishers
                    .get_by_id(id)
                    .await?
                    .with_context(|| format!("Publisher {} not found", id))?;
                Ok((publisher.name, "publisher"))
            }
        }
    }

    /// Email channel: one message to every subscriber with an address.
    ///
    /// An empty subscriber set and a set with no usable addresses are
    /// both skips, not failures.
    async fn send_email(
        &self,
        article: &Article,
        source_name: &str,
        role_label: &str,
        subscribers: &[User],
    ) -> Result<()> {
        if subscribers.is_empty() {
            tracing::info!(
                article_id = article.id,
                "No subscribers found; skipping email notification"
            );
            return Ok(());
        }

        let recipients: Vec<String> = subscribers
            .iter()
            .filter(|s| !s.email.trim().is_empty())
            .map(|s| s.email.clone())
            .collect();

        if recipients.is_empty() {
            tracing::warn!(
                article_id = article.id,
                "No valid email addresses among subscribers; skipping email notification"
            );
            return Ok(());
        }

        let subject = format!("New Article: {}", article.title);
        let body = compose_email_body(&article.title, &article.content, source_name, role_label);

        self.email.send(&recipients, &subject, &body).await?;

        tracing::info!(
            article_id = article.id,
            recipients = recipients.len(),
            "Sent email notification"
        );
        Ok(())
    }

    /// Social channel: a single post announcing the article.
    ///
    /// Missing or placeholder credentials make this a logged no-op.
    async fn post_social(&self, article: &Article, source_name: &str) -> Result<()> {
        if !self.social_config.is_configured() {
            tracing::warn!(
                article_id = article.id,
                "Social API credentials missing or placeholders; skipping social post"
            );
            return Ok(());
        }

        let text = compose_social_post(&article.title, source_name, &article.content);
        self.social.post(&text).await?;

        tracing::info!(article_id = article.id, "Posted article to social channel");
        Ok(())
    }
}

/// Compose the notification email body.
///
/// The quoted content is cut at 200 characters with an ellipsis marker
/// when it exceeds the limit.
pub(crate) fn compose_email_body(
    title: &str,
    content: &str,
    source_name: &str,
    role_label: &str,
) -> String {
    let excerpt = truncate_chars(content, EMAIL_EXCERPT_CHARS);

    format!(
        "Hello,\n\n\
         A new article has been published by {} ({}).\n\n\
         Title: {}\n\n\
         {}\n\n\
         ---\n\
         This is an automated notification from Dispatch.",
        source_name, role_label, title, excerpt
    )
}

/// Compose the social post text: title, byline, and a content excerpt
/// sized to whatever of the 250-character budget remains. The excerpt is
/// dropped entirely when fewer than 50 characters remain.
pub(crate) fn compose_social_post(title: &str, source_name: &str, content: &str) -> String {
    let mut text = format!("{}\n\nBy {}\n\n", title, source_name);

    let remaining = POST_MAX_CHARS.saturating_sub(text.chars().count());
    if remaining > POST_EXCERPT_FLOOR {
        let excerpt: String = content.chars().take(remaining - 3).collect();
        text.push_str(&excerpt);
        text.push_str("...");
    }

    text
}

/// Cut a string at `max` characters, appending `...` when it was longer.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        ArticleRepository, PublisherRepository, SqlxArticleRepository, SqlxPublisherRepository,
        SqlxSubscriptionRepository, SqlxUserRepository, SubscriptionRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreatePublisherInput, UserRole};
    use async_trait::async_trait;
    use sqlx::SqlitePool;
    use std::sync::Mutex;

    // ========================================================================
    // Channel test doubles
    // ========================================================================

    #[derive(Default)]
    struct RecordingEmailSender {
        sent: Mutex<Vec<(Vec<String>, String, String)>>,
    }

    #[async_trait]
    impl EmailSender for RecordingEmailSender {
        async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_vec(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    struct FailingEmailSender;

    #[async_trait]
    impl EmailSender for FailingEmailSender {
        async fn send(&self, _to: &[String], _subject: &str, _body: &str) -> Result<()> {
            Err(anyhow::anyhow!("SMTP relay refused connection"))
        }
    }

    #[derive(Default)]
    struct RecordingSocialPoster {
        posts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SocialPoster for RecordingSocialPoster {
        async fn post(&self, text: &str) -> Result<()> {
            self.posts.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FailingSocialPoster;

    #[async_trait]
    impl SocialPoster for FailingSocialPoster {
        async fn post(&self, _text: &str) -> Result<()> {
            Err(anyhow::anyhow!("Social API returned status 500"))
        }
    }

    fn configured_social() -> SocialConfig {
        SocialConfig {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            access_token: "token".to_string(),
            access_token_secret: "token-secret".to_string(),
            ..SocialConfig::default()
        }
    }

    fn placeholder_social() -> SocialConfig {
        SocialConfig {
            api_key: "your-api-key".to_string(),
            api_secret: "your-api-secret".to_string(),
            access_token: "your-access-token".to_string(),
            access_token_secret: "your-access-token-secret".to_string(),
            ..SocialConfig::default()
        }
    }

    // ========================================================================
    // Fixture
    // ========================================================================

    struct Fixture {
        pool: SqlitePool,
        email: Arc<RecordingEmailSender>,
        social: Arc<RecordingSocialPoster>,
    }

    impl Fixture {
        async fn new() -> Self {
            let pool = create_test_pool().await.expect("pool");
            migrations::run_migrations(&pool).await.expect("migrations");
            Self {
                pool,
                email: Arc::new(RecordingEmailSender::default()),
                social: Arc::new(RecordingSocialPoster::default()),
            }
        }

        fn service(&self, social_config: SocialConfig) -> NotificationService {
            NotificationService::new(
                SqlxSubscriptionRepository::boxed(self.pool.clone()),
                SqlxUserRepository::boxed(self.pool.clone()),
                SqlxPublisherRepository::boxed(self.pool.clone()),
                self.email.clone(),
                self.social.clone(),
                social_config,
            )
        }

        fn service_with(
            &self,
            email: Arc<dyn EmailSender>,
            social: Arc<dyn SocialPoster>,
            social_config: SocialConfig,
        ) -> NotificationService {
            NotificationService::new(
                SqlxSubscriptionRepository::boxed(self.pool.clone()),
                SqlxUserRepository::boxed(self.pool.clone()),
                SqlxPublisherRepository::boxed(self.pool.clone()),
                email,
                social,
                social_config,
            )
        }

        async fn create_user(&self, name: &str, role: UserRole) -> User {
            SqlxUserRepository::new(self.pool.clone())
                .create(&User::new(
                    name.to_string(),
                    format!("{}@example.com", name),
                    "hash".to_string(),
                    role,
                ))
                .await
                .expect("user")
        }

        async fn create_article(&self, source: ArticleSource) -> Article {
            SqlxArticleRepository::new(self.pool.clone())
                .create("Big Story", "Something happened in the city today.", source)
                .await
                .expect("article")
        }

        async fn subscribe(&self, reader_id: i64, target: SubscriptionTarget) {
            SqlxSubscriptionRepository::new(self.pool.clone())
                .add(reader_id, target)
                .await
                .expect("subscribe");
        }
    }

    fn event_for(article: Article) -> ArticleApproved {
        ArticleApproved {
            approved_by: 1,
            approved_at: Utc::now(),
            article,
        }
    }

    // ========================================================================
    // Dispatch tests
    // ========================================================================

    #[tokio::test]
    async fn test_dispatch_emails_subscribers_of_journalist() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        fixture
            .subscribe(reader.id, SubscriptionTarget::Journalist(journalist.id))
            .await;

        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service(configured_social());

        service.dispatch(&event_for(article)).await;

        let sent = fixture.email.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (to, subject, body) = &sent[0];
        assert_eq!(to, &vec!["reader@example.com".to_string()]);
        assert_eq!(subject, "New Article: Big Story");
        assert!(body.contains("writer (journalist)"));
        assert!(body.contains("Title: Big Story"));
    }

    #[tokio::test]
    async fn test_dispatch_emails_subscribers_of_publisher() {
        let fixture = Fixture::new().await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        let publisher = SqlxPublisherRepository::new(fixture.pool.clone())
            .create(&CreatePublisherInput {
                name: "Herald".to_string(),
                description: None,
                website: None,
            })
            .await
            .expect("publisher");
        fixture
            .subscribe(reader.id, SubscriptionTarget::Publisher(publisher.id))
            .await;

        let article = fixture
            .create_article(ArticleSource::Publisher(publisher.id))
            .await;
        let service = fixture.service(configured_social());

        service.dispatch(&event_for(article)).await;

        let sent = fixture.email.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].2.contains("Herald (publisher)"));
    }

    #[tokio::test]
    async fn test_dispatch_skips_email_without_subscribers() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service(configured_social());

        service.dispatch(&event_for(article)).await;

        assert!(fixture.email.sent.lock().unwrap().is_empty());
        // The social channel is independent of the subscriber set
        assert_eq!(fixture.social.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_skips_inactive_subscribers() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        fixture
            .subscribe(reader.id, SubscriptionTarget::Journalist(journalist.id))
            .await;
        SqlxUserRepository::new(fixture.pool.clone())
            .set_active(reader.id, false)
            .await
            .expect("deactivate");

        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service(configured_social());

        service.dispatch(&event_for(article)).await;

        assert!(fixture.email.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_credentials_skip_social_post() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        fixture
            .subscribe(reader.id, SubscriptionTarget::Journalist(journalist.id))
            .await;

        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service(placeholder_social());

        service.dispatch(&event_for(article)).await;

        assert!(fixture.social.posts.lock().unwrap().is_empty());
        // Email is unaffected by the social channel being unconfigured
        assert_eq!(fixture.email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_social_failure_does_not_block_email() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        fixture
            .subscribe(reader.id, SubscriptionTarget::Journalist(journalist.id))
            .await;

        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service_with(
            fixture.email.clone(),
            Arc::new(FailingSocialPoster),
            configured_social(),
        );

        service.dispatch(&event_for(article)).await;

        assert_eq!(fixture.email.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_email_failure_does_not_block_social() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        fixture
            .subscribe(reader.id, SubscriptionTarget::Journalist(journalist.id))
            .await;

        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service_with(
            Arc::new(FailingEmailSender),
            fixture.social.clone(),
            configured_social(),
        );

        service.dispatch(&event_for(article)).await;

        assert_eq!(fixture.social.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_uses_display_name_for_attribution() {
        let fixture = Fixture::new().await;
        let journalist = fixture.create_user("writer", UserRole::Journalist).await;
        let reader = fixture.create_user("reader", UserRole::Reader).await;
        fixture
            .subscribe(reader.id, SubscriptionTarget::Journalist(journalist.id))
            .await;

        sqlx::query("UPDATE users SET display_name = 'Jane Doe' WHERE id = ?")
            .bind(journalist.id)
            .execute(&fixture.pool)
            .await
            .expect("update");

        let article = fixture
            .create_article(ArticleSource::Author(journalist.id))
            .await;
        let service = fixture.service(configured_social());

        service.dispatch(&event_for(article)).await;

        let sent = fixture.email.sent.lock().unwrap();
        assert!(sent[0].2.contains("Jane Doe (journalist)"));
        let posts = fixture.social.posts.lock().unwrap();
        assert!(posts[0].contains("By Jane Doe"));
    }

    // ========================================================================
    // Composition tests
    // ========================================================================

    #[test]
    fn test_email_body_short_content_untruncated() {
        let body = compose_email_body("Title", "Short body.", "Jane", "journalist");
        assert!(body.contains("Short body."));
        assert!(!body.contains("Short body...."));
        assert!(body.contains("Jane (journalist)"));
        assert!(body.ends_with("This is an automated notification from Dispatch."));
    }

    #[test]
    fn test_email_body_truncates_at_200_chars() {
        let content = "x".repeat(450);
        let body = compose_email_body("Title", &content, "Jane", "journalist");

        let expected = format!("{}...", "x".repeat(200));
        assert!(body.contains(&expected));
        assert!(!body.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_email_body_exactly_200_chars_no_ellipsis() {
        let content = "y".repeat(200);
        let body = compose_email_body("Title", &content, "Jane", "journalist");
        assert!(body.contains(&content));
        assert!(!body.contains("yyy..."));
    }

    #[test]
    fn test_social_post_includes_title_and_byline() {
        let post = compose_social_post("Big Story", "Jane Doe", "Body text");
        assert!(post.starts_with("Big Story\n\nBy Jane Doe\n\n"));
        assert!(post.contains("Body text"));
        assert!(post.ends_with("..."));
    }

    #[test]
    fn test_social_post_stays_within_250_chars() {
        let content = "z".repeat(1000);
        let post = compose_social_post("Big Story", "Jane Doe", &content);
        assert!(post.chars().count() <= 250);
        assert!(post.ends_with("..."));
    }

    #[test]
    fn test_social_post_skips_excerpt_when_little_room_remains() {
        // Title + byline consume all but a handful of the 250 characters
        let title = "t".repeat(220);
        let post = compose_social_post(&title, "Jane Doe", "content that will not fit");
        assert!(!post.contains("content"));
        assert!(post.ends_with("\n\n"));
    }
}
