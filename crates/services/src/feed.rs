//! # Feed Queries
//!
//! The four read shapes of the site: global, group, profile and
//! subscription feeds. All of them return a [`Page`] of posts, newest first,
//! [`PAGE_SIZE`] per page.

use std::sync::Arc;

use domains::{
    DomainError, FeedScope, FollowRepository, Group, GroupRepository, Page, PostFilter,
    PostRepository, PostView, Requester, Result, User, UserRepository,
};
use tracing::instrument;

use crate::pagination::{PageRequest, Paginator, PAGE_SIZE};
use crate::policy::require_authenticated;
use crate::{user_by_username, Repositories};

/// A profile page: the owner's posts plus the follow state between the
/// requester and the owner, derived at read time.
#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: User,
    pub page: Page<PostView>,
    /// requester → author
    pub following: bool,
    /// author → requester
    pub followed_by: bool,
    pub followers_count: u64,
    pub following_count: u64,
}

pub struct FeedService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FeedService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: repos.users.clone(),
            groups: repos.groups.clone(),
            posts: repos.posts.clone(),
            follows: repos.follows.clone(),
        }
    }

    /// Counts, clamps the page number, then fetches that slice.
    async fn paginate(&self, scope: FeedScope, filter: &PostFilter, request: PageRequest) -> Result<Page<PostView>> {
        let count = self.posts.count(scope, filter).await?;
        let paginator = Paginator::new(count, PAGE_SIZE);
        let number = paginator.clamp(request);
        let items = self
            .posts
            .list(scope, filter, paginator.limit(), paginator.offset(number))
            .await?;
        Ok(paginator.page(number, items))
    }

    /// All posts, optionally narrowed by text search and date range.
    #[instrument(skip(self))]
    pub async fn global(&self, filter: &PostFilter, request: PageRequest) -> Result<Page<PostView>> {
        self.paginate(FeedScope::All, filter, request).await
    }

    /// Posts filed under the group with this slug.
    #[instrument(skip(self))]
    pub async fn group(&self, slug: &str, request: PageRequest) -> Result<(Group, Page<PostView>)> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;
        let page = self.paginate(FeedScope::Group(group.id), &PostFilter::default(), request).await?;
        Ok((group, page))
    }

    /// Posts written by `username`, plus follow state relative to the requester.
    #[instrument(skip(self, requester))]
    pub async fn profile(&self, requester: &Requester, username: &str, request: PageRequest) -> Result<ProfileFeed> {
        let author = user_by_username(self.users.as_ref(), username).await?;
        let page = self.paginate(FeedScope::Author(author.id), &PostFilter::default(), request).await?;

        let (following, followed_by) = match requester.user_id() {
            Some(me) if me != author.id => (
                self.follows.exists(me, author.id).await?,
                self.follows.exists(author.id, me).await?,
            ),
            _ => (false, false),
        };

        Ok(ProfileFeed {
            followers_count: self.follows.count_followers(author.id).await?,
            following_count: self.follows.count_following(author.id).await?,
            author,
            page,
            following,
            followed_by,
        })
    }

    /// Posts by every author the requester follows.
    #[instrument(skip(self, requester))]
    pub async fn subscriptions(&self, requester: &Requester, request: PageRequest) -> Result<Page<PostView>> {
        let me = require_authenticated(requester, "read the subscription feed")?;
        self.paginate(FeedScope::FollowedBy(me.id), &PostFilter::default(), request).await
    }
}
