//! Row shapes returned by the queries in this module and their mapping onto
//! the domain models.

use chrono::{DateTime, Utc};
use domains::{Comment, CommentView, FollowView, Group, GroupRef, Post, PostView, User};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    id: i64,
    username: String,
    password: String,
    is_staff: bool,
    date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password,
            is_staff: row.is_staff,
            date_joined: row.date_joined,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct GroupRow {
    id: i64,
    title: String,
    slug: String,
    description: String,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group { id: row.id, title: row.title, slug: row.slug, description: row.description }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author_id: row.author_id,
            group_id: row.group_id,
            image: row.image,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct PostViewRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_username: String,
    group_slug: Option<String>,
    group_title: Option<String>,
    comments_count: i64,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        // The LEFT JOIN yields all three group columns or none of them.
        let group = match (row.post.group_id, row.group_slug, row.group_title) {
            (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
            _ => None,
        };
        PostView {
            post: row.post.into(),
            author: row.author_username,
            group,
            comments_count: row.comments_count,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
    created: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author_id: row.author_id,
            text: row.text,
            created: row.created,
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct CommentViewRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_username: String,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        CommentView { comment: row.comment.into(), author: row.author_username }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct FollowViewRow {
    user_username: String,
    author_username: String,
}

impl From<FollowViewRow> for FollowView {
    fn from(row: FollowViewRow) -> Self {
        FollowView { user: row.user_username, author: row.author_username }
    }
}
