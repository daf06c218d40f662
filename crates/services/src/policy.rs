//! # Access Policy
//!
//! The single place that decides who may do what to a post or comment.
//! Reads are open to everyone, creation needs an authenticated requester,
//! and update/delete belong to the resource's author alone.

use domains::{Comment, CommentView, DomainError, Identity, Post, PostView, Requester, Result, UserId};

/// Anything with a fixed author.
pub trait Authored {
    fn author_id(&self) -> UserId;
}

impl Authored for Post {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

impl Authored for PostView {
    fn author_id(&self) -> UserId {
        self.post.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> UserId {
        self.author_id
    }
}

impl Authored for CommentView {
    fn author_id(&self) -> UserId {
        self.comment.author_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    /// Covers both partial edits and full replacement
    Update,
    Delete,
}

impl Action {
    pub fn is_mutation(self) -> bool {
        matches!(self, Action::Update | Action::Delete)
    }
}

/// `true` only when the requester authored the resource.
pub fn may_mutate<R: Authored + ?Sized>(requester: &Requester, resource: &R) -> bool {
    requester.user_id() == Some(resource.author_id())
}

/// Decides whether `action` on `resource` is allowed for `requester`.
/// `resource` is `None` for creation, where there is nothing to own yet.
pub fn permits<R: Authored + ?Sized>(requester: &Requester, action: Action, resource: Option<&R>) -> bool {
    match action {
        Action::Read => true,
        Action::Create => requester.is_authenticated(),
        Action::Update | Action::Delete => resource.is_some_and(|r| may_mutate(requester, r)),
    }
}

/// The authenticated identity, or `Unauthorized`.
pub fn require_authenticated<'a>(requester: &'a Requester, action: &str) -> Result<&'a Identity> {
    requester
        .identity()
        .ok_or_else(|| DomainError::Unauthorized(format!("authentication required to {action}")))
}

/// Anonymous callers get `Unauthorized`, other non-authors get `Forbidden`.
pub fn ensure_may_mutate<R: Authored + ?Sized>(requester: &Requester, resource: &R, what: &str) -> Result<()> {
    require_authenticated(requester, "modify content")?;
    if may_mutate(requester, resource) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(format!("only the author may modify this {what}")))
    }
}

/// Groups have no author; administrators manage them.
pub fn ensure_staff(requester: &Requester) -> Result<&Identity> {
    let identity = require_authenticated(requester, "manage groups")?;
    if identity.is_staff {
        Ok(identity)
    } else {
        Err(DomainError::Forbidden("only administrators may manage groups".into()))
    }
}
