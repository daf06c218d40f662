//! # Ports
//!
//! Persistence and identity contracts. Storage adapters implement the
//! repository traits; auth adapters implement [`PasswordHasher`] and
//! [`TokenService`]. Services only ever hold `Arc<dyn Trait>`.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Comment, CommentId, CommentView, FeedScope, FollowView, Group, GroupId, NewComment, NewGroup,
    NewPost, NewUser, Post, PostChanges, PostFilter, PostId, PostView, TokenPair, User, UserId,
};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// User lookup and lifecycle. Deleting a user cascades to their posts,
/// comments and follow edges in both directions.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn delete(&self, id: UserId) -> Result<()>;
}

/// Group persistence. Deleting a group clears `group_id` on its posts.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>>;
    async fn list(&self) -> Result<Vec<Group>>;
    /// Fails with `Conflict` when the slug is taken.
    async fn create(&self, group: NewGroup) -> Result<Group>;
    async fn delete(&self, id: GroupId) -> Result<()>;
}

/// Post persistence and the feed query shape. Listings are ordered by
/// descending `pub_date`, ties broken by descending id.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: PostId) -> Result<Option<PostView>>;
    async fn create(&self, post: NewPost) -> Result<Post>;
    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post>;
    /// Deletes the post and its comments.
    async fn delete(&self, id: PostId) -> Result<()>;
    async fn count(&self, scope: FeedScope, filter: &PostFilter) -> Result<u64>;
    async fn list(
        &self,
        scope: FeedScope,
        filter: &PostFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostView>>;
}

/// Comment persistence. Listings are newest first.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<CommentView>>;
    async fn create(&self, comment: NewComment) -> Result<Comment>;
    async fn update_text(&self, id: CommentId, text: String) -> Result<Comment>;
    async fn delete(&self, id: CommentId) -> Result<()>;
    async fn count_for_post(&self, post_id: PostId) -> Result<u64>;
    async fn list_for_post(&self, post_id: PostId, limit: u64, offset: u64)
        -> Result<Vec<CommentView>>;
}

/// Follow edges. The store enforces `(user_id, author_id)` uniqueness.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn exists(&self, user_id: UserId, author_id: UserId) -> Result<bool>;
    /// Returns `false` when the edge already existed, including when a
    /// concurrent insert won the unique constraint.
    async fn insert(&self, user_id: UserId, author_id: UserId) -> Result<bool>;
    /// Returns `false` when there was no edge to remove.
    async fn remove(&self, user_id: UserId, author_id: UserId) -> Result<bool>;
    /// Edges where `user_id` is the follower, optionally narrowed by a
    /// case-insensitive substring of the author's username.
    async fn list_for_user(&self, user_id: UserId, author_search: Option<String>)
        -> Result<Vec<FollowView>>;
    async fn count_followers(&self, author_id: UserId) -> Result<u64>;
    async fn count_following(&self, user_id: UserId) -> Result<u64>;
}

/// Password hashing contract.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// The claims carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub username: String,
}

/// Bearer token contract (JWT in production).
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<TokenPair>;
    /// Mints a new access token from a refresh token.
    fn refresh(&self, refresh_token: &str) -> Result<String>;
    /// Validates an access token. Refresh tokens are rejected here.
    fn verify(&self, access_token: &str) -> Result<TokenClaims>;
}
