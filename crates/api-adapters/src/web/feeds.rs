use axum::extract::{Path, Query, State};
use axum::response::Html;
use domains::PostFilter;

use super::render;
use crate::csrf::Csrf;
use crate::dto::ListQuery;
use crate::error::{PageContext, WebResult};
use crate::extract::CurrentUser;
use crate::state::AppState;
use crate::templates::{FeedTemplate, Nav, PostCard, ProfileTemplate};

pub async fn index(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Query(query): Query<ListQuery>,
) -> WebResult<Html<String>> {
    let page = state.feed.global(&PostFilter::default(), query.page_request()).await?;
    let (posts, pager) = PostCard::all(page, &me);
    render(&FeedTemplate {
        nav: Nav::new(&me, csrf),
        title: "Latest posts".to_string(),
        description: String::new(),
        posts,
        pager,
    })
}

pub async fn group(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> WebResult<Html<String>> {
    let (group, page) = state.feed.group(&slug, query.page_request()).await?;
    let (posts, pager) = PostCard::all(page, &me);
    render(&FeedTemplate {
        nav: Nav::new(&me, csrf),
        title: group.title,
        description: group.description,
        posts,
        pager,
    })
}

/// Subscription feed; anonymous visitors are sent to the login page.
pub async fn follow_index(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Query(query): Query<ListQuery>,
) -> WebResult<Html<String>> {
    let page = state.feed.subscriptions(&me, query.page_request()).await.on_page("/follow/", "/")?;
    let (posts, pager) = PostCard::all(page, &me);
    render(&FeedTemplate {
        nav: Nav::new(&me, csrf),
        title: "Your subscriptions".to_string(),
        description: String::new(),
        posts,
        pager,
    })
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Path(username): Path<String>,
    Query(query): Query<ListQuery>,
) -> WebResult<Html<String>> {
    let feed = state.feed.profile(&me, &username, query.page_request()).await?;
    let show_follow = me.user_id().is_some_and(|id| id != feed.author.id);
    let posts_count = feed.page.count;
    let (posts, pager) = PostCard::all(feed.page, &me);
    render(&ProfileTemplate {
        nav: Nav::new(&me, csrf),
        author: feed.author.username,
        posts_count,
        followers_count: feed.followers_count,
        following_count: feed.following_count,
        show_follow,
        following: feed.following,
        followed_by: feed.followed_by,
        posts,
        pager,
    })
}
