//! Askama templates for the rendered surface and the view models they read.
//!
//! Templates only see plain strings, numbers and flags; everything is
//! resolved in Rust before rendering.

use askama::Template;
use domains::{CommentView, Group, Page, PostView, Requester};

/// Header state: who is logged in, plus the CSRF token every form posts.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub authenticated: bool,
    pub username: String,
    pub csrf_token: String,
}

impl Nav {
    pub fn new(requester: &Requester, csrf_token: String) -> Self {
        match requester.identity() {
            Some(identity) => Self { authenticated: true, username: identity.username.clone(), csrf_token },
            None => Self { csrf_token, ..Self::default() },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub pub_date: String,
    pub has_group: bool,
    pub group_slug: String,
    pub group_title: String,
    pub has_image: bool,
    pub image_url: String,
    pub comments_count: i64,
    pub can_edit: bool,
}

impl PostCard {
    pub fn new(view: PostView, requester: &Requester) -> Self {
        let can_edit = requester.user_id() == Some(view.post.author_id);
        let (group_slug, group_title) = view.group.map(|g| (g.slug, g.title)).unwrap_or_default();
        let image_url = view.post.image.map(|path| format!("/media/{path}")).unwrap_or_default();
        Self {
            id: view.post.id,
            author: view.author,
            text: view.post.text,
            pub_date: view.post.pub_date.format("%d %b %Y %H:%M").to_string(),
            has_group: !group_slug.is_empty(),
            group_slug,
            group_title,
            has_image: !image_url.is_empty(),
            image_url,
            comments_count: view.comments_count,
            can_edit,
        }
    }

    pub fn all(page: Page<PostView>, requester: &Requester) -> (Vec<PostCard>, Pager) {
        let pager = Pager::from(&page);
        (page.items.into_iter().map(|v| PostCard::new(v, requester)).collect(), pager)
    }
}

#[derive(Debug, Clone)]
pub struct CommentCard {
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<CommentView> for CommentCard {
    fn from(view: CommentView) -> Self {
        Self {
            author: view.author,
            text: view.comment.text,
            created: view.comment.created.format("%d %b %Y %H:%M").to_string(),
        }
    }
}

/// Page links. `previous`/`next` are 0 when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub number: u32,
    pub num_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: u32,
    pub next: u32,
}

impl<T> From<&Page<T>> for Pager {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.previous_number().unwrap_or(0),
            next: page.next_number().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

impl GroupOption {
    pub fn all(groups: Vec<Group>, selected: Option<i64>) -> Vec<GroupOption> {
        groups
            .into_iter()
            .map(|g| GroupOption { selected: Some(g.id) == selected, id: g.id, title: g.title })
            .collect()
    }
}

/// Global, group and subscription feeds.
#[derive(Template)]
#[template(path = "feed.html")]
pub struct FeedTemplate {
    pub nav: Nav,
    pub title: String,
    pub description: String,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub nav: Nav,
    pub author: String,
    pub posts_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    /// Shown only to a logged-in visitor looking at someone else
    pub show_follow: bool,
    pub following: bool,
    pub followed_by: bool,
    pub posts: Vec<PostCard>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub nav: Nav,
    pub post: PostCard,
    pub comments: Vec<CommentCard>,
    pub comment_error: String,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub nav: Nav,
    pub heading: String,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub error: String,
}

/// Login and sign-up forms.
#[derive(Template)]
#[template(path = "auth_form.html")]
pub struct AuthFormTemplate {
    pub nav: Nav,
    pub heading: String,
    pub action: String,
    pub submit: String,
    pub next: String,
    pub username: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub nav: Nav,
    pub title: String,
    pub message: String,
}
