//! # MemoryStore
//!
//! A process-local implementation of every repository port, backed by
//! `dashmap`. It mirrors the relational rules of the Postgres schema:
//! cascading deletes from users and posts, `SET NULL` on group deletion and
//! a unique `(user, author)` follow pair. Used by tests and by local runs
//! without a database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use domains::{
    Comment, CommentId, CommentRepository, CommentView, DomainError, FeedScope, Follow,
    FollowRepository, FollowView, Group, GroupId, GroupRef, GroupRepository, NewComment, NewGroup,
    NewPost, NewUser, Post, PostChanges, PostFilter, PostId, PostRepository, PostView, Result,
    User, UserId, UserRepository,
};
use tracing::debug;

/// Monotonic id source, one per table, starting at 1 like a serial column.
#[derive(Debug, Default)]
struct Sequence(AtomicI64);

impl Sequence {
    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    usernames: DashMap<String, UserId>,
    groups: DashMap<GroupId, Group>,
    slugs: DashMap<String, GroupId>,
    posts: DashMap<PostId, Post>,
    comments: DashMap<CommentId, Comment>,
    follows: DashSet<Follow>,
    user_ids: Sequence,
    group_ids: Sequence,
    post_ids: Sequence,
    comment_ids: Sequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a user without going through hashing; handy for seeding tests.
    pub fn insert_user(&self, username: &str, password_hash: &str, is_staff: bool) -> Result<User> {
        let id = match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!("username '{username}' is taken")))
            }
            Entry::Vacant(slot) => {
                let id = self.user_ids.next();
                slot.insert(id);
                id
            }
        };
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_staff,
            date_joined: Utc::now(),
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn username_of(&self, id: UserId) -> String {
        self.users.get(&id).map(|u| u.username.clone()).unwrap_or_default()
    }

    fn view(&self, post: Post) -> PostView {
        let group = post.group_id.and_then(|gid| {
            self.groups.get(&gid).map(|g| GroupRef { id: g.id, slug: g.slug.clone(), title: g.title.clone() })
        });
        let comments_count = self.comments.iter().filter(|c| c.post_id == post.id).count() as i64;
        PostView { author: self.username_of(post.author_id), group, comments_count, post }
    }

    /// Posts in scope, newest first.
    fn select(&self, scope: FeedScope, filter: &PostFilter) -> Vec<Post> {
        let followed: HashSet<UserId> = match scope {
            FeedScope::FollowedBy(user_id) => self
                .follows
                .iter()
                .filter(|f| f.user_id == user_id)
                .map(|f| f.author_id)
                .collect(),
            _ => HashSet::new(),
        };
        let in_scope = |p: &Post| match scope {
            FeedScope::All => true,
            FeedScope::Group(gid) => p.group_id == Some(gid),
            FeedScope::Author(uid) => p.author_id == uid,
            FeedScope::FollowedBy(_) => followed.contains(&p.author_id),
        };

        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| in_scope(p.value()) && filter.matches(p.value()))
            .map(|p| p.value().clone())
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn delete_comments_where(&self, pred: impl Fn(&Comment) -> bool) {
        self.comments.retain(|_, c| !pred(c));
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let id = self.usernames.get(username).map(|id| *id);
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        self.insert_user(&user.username, &user.password_hash, user.is_staff)
    }

    async fn delete(&self, id: UserId) -> Result<()> {
        let Some((_, user)) = self.users.remove(&id) else {
            return Ok(());
        };
        self.usernames.remove(&user.username);

        // 1. Posts by the user, and every comment under them
        let doomed: HashSet<PostId> = self
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        self.posts.retain(|pid, _| !doomed.contains(pid));
        // 2. The user's own comments elsewhere
        self.delete_comments_where(|c| c.author_id == id || doomed.contains(&c.post_id));
        // 3. Follow edges in both directions
        self.follows.retain(|f| f.user_id != id && f.author_id != id);

        debug!(user_id = id, posts = doomed.len(), "user deleted with cascade");
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>> {
        Ok(self.groups.get(&id).map(|g| g.clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let id = self.slugs.get(slug).map(|id| *id);
        Ok(id.and_then(|id| self.groups.get(&id).map(|g| g.clone())))
    }

    async fn list(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self.groups.iter().map(|g| g.clone()).collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn create(&self, group: NewGroup) -> Result<Group> {
        let id = match self.slugs.entry(group.slug.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict(format!("group with slug '{}' already exists", group.slug)))
            }
            Entry::Vacant(slot) => {
                let id = self.group_ids.next();
                slot.insert(id);
                id
            }
        };
        let group = Group { id, title: group.title, slug: group.slug, description: group.description };
        self.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn delete(&self, id: GroupId) -> Result<()> {
        if let Some((_, group)) = self.groups.remove(&id) {
            self.slugs.remove(&group.slug);
            for mut post in self.posts.iter_mut() {
                if post.group_id == Some(id) {
                    post.group_id = None;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: PostId) -> Result<Option<PostView>> {
        let post = self.posts.get(&id).map(|p| p.clone());
        Ok(post.map(|p| self.view(p)))
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        if !self.users.contains_key(&post.author_id) {
            return Err(DomainError::not_found("user", post.author_id));
        }
        let id = self.post_ids.next();
        let post = Post {
            id,
            text: post.text,
            pub_date: Utc::now(),
            author_id: post.author_id,
            group_id: post.group_id,
            image: post.image,
        };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: PostId, changes: PostChanges) -> Result<Post> {
        let mut post = self.posts.get_mut(&id).ok_or_else(|| DomainError::not_found("post", id))?;
        post.text = changes.text;
        post.group_id = changes.group_id;
        post.image = changes.image;
        Ok(post.clone())
    }

    async fn delete(&self, id: PostId) -> Result<()> {
        self.posts.remove(&id);
        self.delete_comments_where(|c| c.post_id == id);
        Ok(())
    }

    async fn count(&self, scope: FeedScope, filter: &PostFilter) -> Result<u64> {
        Ok(self.select(scope, filter).len() as u64)
    }

    async fn list(&self, scope: FeedScope, filter: &PostFilter, limit: u64, offset: u64) -> Result<Vec<PostView>> {
        Ok(self
            .select(scope, filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| self.view(p))
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<CommentView>> {
        let comment = self.comments.get(&id).map(|c| c.clone());
        Ok(comment.map(|c| CommentView { author: self.username_of(c.author_id), comment: c }))
    }

    async fn create(&self, comment: NewComment) -> Result<Comment> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(DomainError::not_found("post", comment.post_id));
        }
        let id = self.comment_ids.next();
        let comment = Comment {
            id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            created: Utc::now(),
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn update_text(&self, id: CommentId, text: String) -> Result<Comment> {
        let mut comment = self.comments.get_mut(&id).ok_or_else(|| DomainError::not_found("comment", id))?;
        comment.text = text;
        Ok(comment.clone())
    }

    async fn delete(&self, id: CommentId) -> Result<()> {
        self.comments.remove(&id);
        Ok(())
    }

    async fn count_for_post(&self, post_id: PostId) -> Result<u64> {
        Ok(self.comments.iter().filter(|c| c.post_id == post_id).count() as u64)
    }

    async fn list_for_post(&self, post_id: PostId, limit: u64, offset: u64) -> Result<Vec<CommentView>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.clone())
            .collect();
        comments.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(comments
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|c| CommentView { author: self.username_of(c.author_id), comment: c })
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn exists(&self, user_id: UserId, author_id: UserId) -> Result<bool> {
        Ok(self.follows.contains(&Follow { user_id, author_id }))
    }

    async fn insert(&self, user_id: UserId, author_id: UserId) -> Result<bool> {
        if user_id == author_id {
            return Err(DomainError::ValidationError("a user cannot follow themselves".into()));
        }
        Ok(self.follows.insert(Follow { user_id, author_id }))
    }

    async fn remove(&self, user_id: UserId, author_id: UserId) -> Result<bool> {
        Ok(self.follows.remove(&Follow { user_id, author_id }).is_some())
    }

    async fn list_for_user(&self, user_id: UserId, author_search: Option<String>) -> Result<Vec<FollowView>> {
        let user = self.username_of(user_id);
        let needle = author_search.map(|s| s.to_lowercase());
        let mut views: Vec<FollowView> = self
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| FollowView { user: user.clone(), author: self.username_of(f.author_id) })
            .filter(|v| needle.as_ref().map_or(true, |n| v.author.to_lowercase().contains(n.as_str())))
            .collect();
        views.sort_by(|a, b| a.author.cmp(&b.author));
        Ok(views)
    }

    async fn count_followers(&self, author_id: UserId) -> Result<u64> {
        Ok(self.follows.iter().filter(|f| f.author_id == author_id).count() as u64)
    }

    async fn count_following(&self, user_id: UserId) -> Result<u64> {
        Ok(self.follows.iter().filter(|f| f.user_id == user_id).count() as u64)
    }
}
