//! Services layer - Business logic
//!
//! This module contains all business logic services for the Dispatch
//! core. Services are responsible for:
//! - Implementing business rules over the repositories
//! - Authorization gating and validation
//! - Emitting and consuming the approval event

pub mod approval;
pub mod article;
pub mod authorization;
pub mod clock;
pub mod email;
pub mod newsletter;
pub mod notification;
pub mod password;
pub mod social;
pub mod subscription;
pub mod user;

pub use approval::{ApprovalError, ApprovalService};
pub use article::{ArticleService, ArticleServiceError};
pub use authorization::{can_perform, Action};
pub use clock::{Clock, FixedClock, SystemClock};
pub use email::{EmailSender, SmtpEmailSender};
pub use newsletter::{NewsletterService, NewsletterServiceError};
pub use notification::{ArticleApproved, NotificationChannelError, NotificationService};
pub use password::{hash_password, verify_password};
pub use social::{HttpSocialPoster, SocialPoster};
pub use subscription::{SubscriptionService, SubscriptionServiceError};
pub use user::{UserService, UserServiceError};
