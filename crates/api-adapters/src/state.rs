//! Shared handler state.

use std::sync::Arc;

use services::{
    AccountService, CommentService, FeedService, GroupService, PostService, Repositories,
    SubscriptionService,
};

use crate::metrics::Metrics;

/// How the session cookie is issued.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    /// Idle lifetime in seconds; matches the access token lifetime.
    pub max_age: i64,
}

/// State shared across all axum handlers. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub groups: Arc<GroupService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub accounts: Arc<AccountService>,
    pub metrics: Arc<Metrics>,
    pub cookie: CookiePolicy,
}

impl AppState {
    pub fn new(repos: &Repositories, accounts: AccountService, cookie: CookiePolicy) -> Self {
        Self {
            feed: Arc::new(FeedService::new(repos)),
            posts: Arc::new(PostService::new(repos)),
            comments: Arc::new(CommentService::new(repos)),
            groups: Arc::new(GroupService::new(repos)),
            subscriptions: Arc::new(SubscriptionService::new(repos)),
            accounts: Arc::new(accounts),
            metrics: Arc::new(Metrics::new()),
            cookie,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").field("cookie", &self.cookie).finish_non_exhaustive()
    }
}
