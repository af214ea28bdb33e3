//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod newsletter;
pub mod publisher;
pub mod subscription;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use newsletter::{NewsletterRepository, SqlxNewsletterRepository};
pub use publisher::{PublisherRepository, SqlxPublisherRepository};
pub use subscription::{SqlxSubscriptionRepository, SubscriptionRepository};
pub use user::{SqlxUserRepository, UserRepository};
