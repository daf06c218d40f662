//! # Domain Models
//!
//! These structs represent the core entities of Yatube: users, groups, posts,
//! comments and follow edges. Identifiers are database-assigned `i64` keys.
//!
//! Relations the ORM would normally expose as reverse collections
//! (`user.posts`, `group.posts`, `post.comments`) are not modelled here; they
//! are explicit query methods on the repository ports instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type GroupId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// An authentication identity. Owned by the auth collaborator; the core only
/// compares ids and reads the username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// PHC-formatted hash, never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Administrators may create and delete groups.
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
}

/// A community that posts can optionally be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    /// Unique, URL-safe lookup key (e.g. "news" for /group/news/)
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// A stored post row. `author_id` and `pub_date` never change after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: UserId,
    pub group_id: Option<GroupId>,
    /// Path of the attached image relative to the media root
    pub image: Option<String>,
}

/// The group fields a post listing needs without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: GroupId,
    pub slug: String,
    pub title: String,
}

/// A post joined with its author's username and group summary, as returned
/// by every feed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author: String,
    pub group: Option<GroupRef>,
    pub comments_count: i64,
}

/// Insert payload for a post. The author is always the requester.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub text: String,
    pub author_id: UserId,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

/// The mutable fields of a post. Author and publication date are absent on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: PostId,
    pub author_id: UserId,
    pub text: String,
}

/// A directed edge: `user` receives `author`'s posts in their subscription feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Follow {
    pub user_id: UserId,
    pub author_id: UserId,
}

/// A follow edge resolved to usernames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowView {
    pub user: String,
    pub author: String,
}

/// Which posts a feed query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    All,
    Group(GroupId),
    Author(UserId),
    /// Posts by every author the given user follows
    FollowedBy(UserId),
}

/// Optional narrowing applied on top of a [`FeedScope`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostFilter {
    /// Case-insensitive substring match on the post text
    pub search: Option<String>,
    /// Inclusive lower bound on `pub_date`
    pub published_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `pub_date`
    pub published_before: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.published_after.is_none() && self.published_before.is_none()
    }

    /// Evaluates the filter against a post in memory.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(needle) = &self.search {
            if !post.text.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(after) = self.published_after {
            if post.pub_date < after {
                return false;
            }
        }
        if let Some(before) = self.published_before {
            if post.pub_date > before {
                return false;
            }
        }
        true
    }
}

/// One page of an ordered listing plus the metadata a pager widget needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based index of this page, already clamped into range
    pub number: u32,
    /// Always at least 1, even for an empty listing
    pub num_pages: u32,
    /// Total number of items across all pages
    pub count: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
        }
    }
}

/// The authenticated caller as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub is_staff: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}

/// Who is making a request. Reads are open to everyone; writes need `User`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Requester {
    #[default]
    Anonymous,
    User(Identity),
}

impl Requester {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Requester::Anonymous => None,
            Requester::User(identity) => Some(identity),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.identity().map(|i| i.id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Requester::User(_))
    }
}

/// Access token plus the longer-lived token used to mint new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}
