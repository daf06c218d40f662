//! # JSON bodies of the REST surface
//!
//! Request payloads never carry an author: it always comes from the
//! authenticated requester.

use chrono::{DateTime, Utc};
use domains::{CommentView, FollowView, Group, GroupId, Page, PostFilter, PostView, TokenPair, User};
use serde::{Deserialize, Deserializer, Serialize};
use services::{PageRequest, PostDraft, PostUpdate, ProfileFeed};

/// Query string shared by every paginated listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub published_after: Option<DateTime<Utc>>,
    pub published_before: Option<DateTime<Utc>>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }

    pub fn post_filter(&self) -> PostFilter {
        PostFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            published_after: self.published_after,
            published_before: self.published_before,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Paginated envelope: `next` and `previous` are page numbers.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub num_pages: u32,
    pub page: u32,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn from_page<S>(page: Page<S>, f: impl FnMut(S) -> T) -> Self {
        let (next, previous) = (page.next_number(), page.previous_number());
        let page = page.map(f);
        Self {
            count: page.count,
            num_pages: page.num_pages,
            page: page.number,
            next,
            previous,
            results: page.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostOut {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    /// Group id, the same value `PostIn.group` accepts.
    pub group: Option<GroupId>,
    pub image: Option<String>,
    pub comments_count: i64,
}

impl From<PostView> for PostOut {
    fn from(view: PostView) -> Self {
        Self {
            id: view.post.id,
            text: view.post.text,
            pub_date: view.post.pub_date,
            author: view.author,
            group: view.post.group_id,
            image: view.post.image,
            comments_count: view.comments_count,
        }
    }
}

/// `POST` and `PUT` body. `group` is a group id.
#[derive(Debug, Deserialize)]
pub struct PostIn {
    pub text: String,
    #[serde(default)]
    pub group: Option<GroupId>,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<PostIn> for PostDraft {
    fn from(input: PostIn) -> Self {
        Self { text: input.text, group_id: input.group, image: input.image }
    }
}

/// `PATCH` body. An explicit `null` clears a field, an absent key keeps it.
#[derive(Debug, Default, Deserialize)]
pub struct PostPatch {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub group: Option<Option<GroupId>>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

impl From<PostPatch> for PostUpdate {
    fn from(patch: PostPatch) -> Self {
        Self { text: patch.text, group_id: patch.group, image: patch.image }
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct CommentOut {
    pub id: i64,
    pub post: i64,
    pub author: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl From<CommentView> for CommentOut {
    fn from(view: CommentView) -> Self {
        Self {
            id: view.comment.id,
            post: view.comment.post_id,
            author: view.author,
            text: view.comment.text,
            created: view.comment.created,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentIn {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GroupOut {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupOut {
    fn from(group: Group) -> Self {
        Self { id: group.id, title: group.title, slug: group.slug, description: group.description }
    }
}

#[derive(Debug, Serialize)]
pub struct FollowOut {
    pub user: String,
    pub author: String,
}

impl From<FollowView> for FollowOut {
    fn from(view: FollowView) -> Self {
        Self { user: view.user, author: view.author }
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowIn {
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileOut {
    pub username: String,
    pub date_joined: DateTime<Utc>,
    pub followers_count: u64,
    pub following_count: u64,
    pub following: bool,
    pub followed_by: bool,
    pub posts: Paginated<PostOut>,
}

impl From<ProfileFeed> for ProfileOut {
    fn from(feed: ProfileFeed) -> Self {
        Self {
            username: feed.author.username,
            date_joined: feed.author.date_joined,
            followers_count: feed.followers_count,
            following_count: feed.following_count,
            following: feed.following,
            followed_by: feed.followed_by,
            posts: Paginated::from_page(feed.page, PostOut::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, date_joined: user.date_joined }
    }
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshIn {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessOut {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct TokenOut {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPair> for TokenOut {
    fn from(pair: TokenPair) -> Self {
        Self { access: pair.access, refresh: pair.refresh }
    }
}
