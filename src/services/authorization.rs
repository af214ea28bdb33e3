//! Authorization rules
//!
//! A single pure decision function maps an actor, an action, and the
//! targeted resource to allow or deny. Rules are evaluated in a fixed
//! precedence order and anything that matches no allow rule is denied.
//! The function has no side effects and never fails; callers translate a
//! deny into their `Forbidden` error.

use crate::models::{Article, Newsletter, User};

/// An action an actor wants to perform, carrying the targeted resource
/// where the decision depends on it.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Create a new article
    CreateArticle,
    /// Edit an existing article's content
    EditArticle(&'a Article),
    /// Delete an article
    DeleteArticle(&'a Article),
    /// Approve a pending article (role-gated only; the pending check
    /// belongs to the approval machine, not to authorization)
    ApproveArticle,
    /// View an article
    ViewArticle(&'a Article),
    /// Create a new newsletter
    CreateNewsletter,
    /// Edit a newsletter or its article references
    EditNewsletter(&'a Newsletter),
}

/// Decide whether `actor` may perform `action`.
///
/// - approve: editors only
/// - create article/newsletter: journalists only
/// - edit/delete article: editors, or the authoring journalist
/// - view article: anyone once approved; editors and the authoring
///   journalist even while pending
/// - edit newsletter: editors, or the owning journalist
pub fn can_perform(actor: &User, action: Action<'_>) -> bool {
    match action {
        Action::ApproveArticle => actor.is_editor(),
        Action::CreateArticle | Action::CreateNewsletter => actor.is_journalist(),
        Action::EditArticle(article) | Action::DeleteArticle(article) => {
            actor.is_editor() || (actor.is_journalist() && article.authored_by(actor.id))
        }
        Action::ViewArticle(article) => {
            article.approved
                || actor.is_editor()
                || (actor.is_journalist() && article.authored_by(actor.id))
        }
        Action::EditNewsletter(newsletter) => {
            actor.is_editor() || (actor.is_journalist() && newsletter.owned_by(actor.id))
        }
    }
}
