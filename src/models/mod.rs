//! Data models
//!
//! This module contains all data structures used throughout the Dispatch
//! core. Models represent:
//! - Database entities (User, Publisher, Article, Newsletter)
//! - Input types accepted by the services

mod article;
mod newsletter;
mod publisher;
mod subscription;
mod user;

pub use article::{Article, ArticleSource, CreateArticleInput, UpdateArticleInput};
pub use newsletter::{
    CreateNewsletterInput, Newsletter, NewsletterView, UpdateNewsletterInput,
};
pub use publisher::{CreatePublisherInput, MemberRole, Publisher};
pub use subscription::SubscriptionTarget;
pub use user::{CreateUserInput, User, UserRole};
