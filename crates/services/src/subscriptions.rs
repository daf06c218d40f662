//! # Subscription Manager
//!
//! Follow state for a `(user, author)` pair is either following or not.
//! The rendered site treats every transition as idempotent: following twice,
//! following yourself and unfollowing someone you do not follow are all
//! silent no-ops. The REST API rejects self-follow and duplicates with a
//! validation error instead; both behaviours live here side by side.

use std::sync::Arc;

use domains::{
    DomainError, FollowRepository, FollowView, Requester, Result, User, UserRepository,
};
use tracing::{debug, info, instrument};

use crate::policy::require_authenticated;
use crate::{user_by_username, Repositories};

pub const SELF_SUBSCRIPTION: &str = "You can't subscribe to yourself.";
pub const DUPLICATE_SUBSCRIPTION: &str = "Subscription to the author is already arranged.";

/// Result of a rendered-surface follow or unfollow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowOutcome {
    pub author: User,
    /// `false` when the edge was already in the requested state.
    pub changed: bool,
}

pub struct SubscriptionService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl SubscriptionService {
    pub fn new(repos: &Repositories) -> Self {
        Self { users: repos.users.clone(), follows: repos.follows.clone() }
    }

    /// Starts following `username`. The outcome carries the target for the
    /// profile redirect.
    #[instrument(skip(self, requester))]
    pub async fn follow(&self, requester: &Requester, username: &str) -> Result<FollowOutcome> {
        let me = require_authenticated(requester, "follow authors")?;
        let author = user_by_username(self.users.as_ref(), username).await?;
        if author.id == me.id {
            debug!(user = %me.username, "ignoring self-follow");
            return Ok(FollowOutcome { author, changed: false });
        }
        // A lost race on the unique pair also reports `false`; same end state.
        let changed = self.follows.insert(me.id, author.id).await?;
        if changed {
            info!(user = %me.username, author = %author.username, "follow created");
        }
        Ok(FollowOutcome { author, changed })
    }

    /// Stops following `username`; a missing edge is fine.
    #[instrument(skip(self, requester))]
    pub async fn unfollow(&self, requester: &Requester, username: &str) -> Result<FollowOutcome> {
        let me = require_authenticated(requester, "unfollow authors")?;
        let author = user_by_username(self.users.as_ref(), username).await?;
        let changed = self.follows.remove(me.id, author.id).await?;
        if changed {
            info!(user = %me.username, author = %author.username, "follow removed");
        }
        Ok(FollowOutcome { author, changed })
    }

    /// REST variant of [`follow`](Self::follow): self-follow, duplicates and
    /// unknown authors are validation errors.
    #[instrument(skip(self, requester))]
    pub async fn subscribe(&self, requester: &Requester, author: &str) -> Result<FollowView> {
        let me = require_authenticated(requester, "follow authors")?;
        let target = self
            .users
            .find_by_username(author)
            .await?
            .ok_or_else(|| DomainError::ValidationError(format!("author '{author}' does not exist")))?;
        if target.id == me.id {
            return Err(DomainError::ValidationError(SELF_SUBSCRIPTION.into()));
        }
        if self.follows.exists(me.id, target.id).await? || !self.follows.insert(me.id, target.id).await? {
            return Err(DomainError::ValidationError(DUPLICATE_SUBSCRIPTION.into()));
        }
        info!(user = %me.username, author = %target.username, "follow created");
        Ok(FollowView { user: me.username.clone(), author: target.username })
    }

    /// The requester's outgoing edges, optionally filtered by author name.
    pub async fn list(&self, requester: &Requester, search: Option<String>) -> Result<Vec<FollowView>> {
        let me = require_authenticated(requester, "list subscriptions")?;
        let search = search.filter(|s| !s.trim().is_empty());
        self.follows.list_for_user(me.id, search).await
    }
}
