//! # services
//!
//! Use cases for Yatube, written only against the ports in `domains`.
//! Every service is constructed once at startup from a [`Repositories`]
//! bundle and shared by reference; nothing here keeps state between calls.

pub mod accounts;
pub mod comments;
pub mod feed;
pub mod groups;
pub mod pagination;
pub mod policy;
pub mod posts;
pub mod subscriptions;

use std::sync::Arc;

use domains::{CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository};

pub use accounts::AccountService;
pub use comments::CommentService;
pub use feed::{FeedService, ProfileFeed};
pub use groups::GroupService;
pub use pagination::{PageRequest, Paginator, PAGE_SIZE};
pub use posts::{PostDraft, PostService, PostUpdate};
pub use subscriptions::{FollowOutcome, SubscriptionService};

/// The storage handles every service is built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    /// Uses one store object for all five ports.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + GroupRepository + PostRepository + CommentRepository + FollowRepository + 'static,
    {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            follows: store,
        }
    }
}

/// Resolves a username or fails with `NotFound`.
pub(crate) async fn user_by_username(
    users: &dyn UserRepository,
    username: &str,
) -> domains::Result<domains::User> {
    users
        .find_by_username(username)
        .await?
        .ok_or_else(|| domains::DomainError::not_found("user", username))
}
