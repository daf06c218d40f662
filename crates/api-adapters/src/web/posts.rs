use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use domains::{DomainError, GroupId, PostId, Requester};
use serde::Deserialize;
use services::policy::{ensure_may_mutate, require_authenticated};
use services::{PostDraft, PostUpdate};

use super::{post_path, render};
use crate::csrf::{Csrf, CsrfForm, Empty};
use crate::error::{PageContext, WebError, WebResult};
use crate::extract::CurrentUser;
use crate::metrics::Event;
use crate::state::AppState;
use crate::templates::{CommentCard, GroupOption, Nav, PostCard, PostFormTemplate, PostTemplate};

/// The post form. `group` is empty when no group is chosen.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub text: String,
    #[serde(default)]
    pub group: String,
}

impl PostForm {
    fn group_id(&self) -> Result<Option<GroupId>, DomainError> {
        match self.group.trim() {
            "" => Ok(None),
            raw => raw
                .parse()
                .map(Some)
                .map_err(|_| DomainError::ValidationError("Select a valid group.".to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

async fn form_page(
    state: &AppState,
    nav: Nav,
    heading: &str,
    action: &str,
    text: String,
    group: Option<GroupId>,
    error: String,
) -> WebResult<Html<String>> {
    let groups = state.groups.list().await?;
    render(&PostFormTemplate {
        nav,
        heading: heading.to_string(),
        action: action.to_string(),
        text,
        groups: GroupOption::all(groups, group),
        error,
    })
}

pub async fn new_form(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
) -> WebResult<Html<String>> {
    require_authenticated(&me, "create posts").map(|_| ()).on_page("/new/", "/")?;
    form_page(&state, Nav::new(&me, csrf), "New post", "/new/", String::new(), None, String::new()).await
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    CsrfForm(form): CsrfForm<PostForm>,
) -> WebResult<Response> {
    require_authenticated(&me, "create posts").map(|_| ()).on_page("/new/", "/")?;
    let attempt = match form.group_id() {
        Ok(group_id) => {
            let draft = PostDraft { text: form.text.clone(), group_id, image: None };
            state.posts.create(&me, draft).await
        }
        Err(err) => Err(err),
    };
    match attempt {
        Ok(_) => {
            state.metrics.record(Event::PostCreated);
            Ok(Redirect::to("/").into_response())
        }
        Err(DomainError::ValidationError(msg)) => {
            let group = form.group_id().ok().flatten();
            let nav = Nav::new(&me, csrf);
            let page = form_page(&state, nav, "New post", "/new/", form.text, group, msg).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(WebError::at(err, "/new/", "/")),
    }
}

async fn post_page(
    state: &AppState,
    me: &Requester,
    csrf: String,
    username: &str,
    post_id: PostId,
    comment_error: String,
) -> WebResult<Html<String>> {
    let view = state.posts.get_scoped(username, post_id).await?;
    let comments = state.comments.all_for_post(post_id).await?;
    render(&PostTemplate {
        nav: Nav::new(me, csrf),
        post: PostCard::new(view, me),
        comments: comments.into_iter().map(CommentCard::from).collect(),
        comment_error,
    })
}

pub async fn view(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Path((username, post_id)): Path<(String, PostId)>,
) -> WebResult<Html<String>> {
    post_page(&state, &me, csrf, &username, post_id, String::new()).await
}

pub async fn edit_form(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Path((username, post_id)): Path<(String, PostId)>,
) -> WebResult<Html<String>> {
    let read_view = post_path(&username, post_id);
    let action = format!("{read_view}edit/");
    let current = state.posts.get_scoped(&username, post_id).await?;
    ensure_may_mutate(&me, &current, "post").on_page(&action, &read_view)?;
    let (text, group) = (current.post.text, current.post.group_id);
    form_page(&state, Nav::new(&me, csrf), "Edit post", &action, text, group, String::new()).await
}

pub async fn edit(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Path((username, post_id)): Path<(String, PostId)>,
    CsrfForm(form): CsrfForm<PostForm>,
) -> WebResult<Response> {
    let read_view = post_path(&username, post_id);
    let action = format!("{read_view}edit/");
    let current = state.posts.get_scoped(&username, post_id).await?;
    ensure_may_mutate(&me, &current, "post").on_page(&action, &read_view)?;

    let attempt = match form.group_id() {
        Ok(group_id) => {
            let update = PostUpdate { text: Some(form.text.clone()), group_id: Some(group_id), image: None };
            state.posts.update(&me, post_id, update).await
        }
        Err(err) => Err(err),
    };
    match attempt {
        Ok(_) => {
            state.metrics.record(Event::PostUpdated);
            Ok(Redirect::to(&read_view).into_response())
        }
        Err(DomainError::ValidationError(msg)) => {
            let group = form.group_id().ok().flatten();
            let nav = Nav::new(&me, csrf);
            let page = form_page(&state, nav, "Edit post", &action, form.text, group, msg).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(WebError::at(err, &action, &read_view)),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path((username, post_id)): Path<(String, PostId)>,
    CsrfForm(_): CsrfForm<Empty>,
) -> WebResult<Redirect> {
    let read_view = post_path(&username, post_id);
    state.posts.get_scoped(&username, post_id).await?;
    state.posts.delete(&me, post_id).await.on_page(&read_view, &read_view)?;
    state.metrics.record(Event::PostDeleted);
    Ok(Redirect::to(&format!("/{username}/")))
}

pub async fn comment(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Path((username, post_id)): Path<(String, PostId)>,
    CsrfForm(form): CsrfForm<CommentForm>,
) -> WebResult<Response> {
    let read_view = post_path(&username, post_id);
    state.posts.get_scoped(&username, post_id).await?;
    match state.comments.create(&me, post_id, form.text).await {
        Ok(_) => {
            state.metrics.record(Event::CommentCreated);
            Ok(Redirect::to(&read_view).into_response())
        }
        Err(DomainError::ValidationError(msg)) => {
            let page = post_page(&state, &me, csrf, &username, post_id, msg).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(WebError::at(err, &read_view, &read_view)),
    }
}
