//! # Rendered surface
//!
//! Server-side HTML pages. Writes are plain form POSTs answered with a
//! 303 redirect; see [`WebError`](crate::error::WebError) for how failures
//! surface.

mod accounts;
mod feeds;
mod posts;
mod subscriptions;

use askama::Template;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use domains::DomainError;

use crate::error::WebResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(feeds::index))
        .route("/group/{slug}/", get(feeds::group))
        .route("/follow/", get(feeds::follow_index))
        .route("/new/", get(posts::new_form).post(posts::create))
        .route("/auth/signup/", get(accounts::signup_form).post(accounts::signup))
        .route("/auth/login/", get(accounts::login_form).post(accounts::login))
        .route("/auth/logout/", post(accounts::logout))
        .route("/{username}/", get(feeds::profile))
        .route("/{username}/follow/", post(subscriptions::follow))
        .route("/{username}/unfollow/", post(subscriptions::unfollow))
        .route("/{username}/{post_id}/", get(posts::view))
        .route("/{username}/{post_id}/edit/", get(posts::edit_form).post(posts::edit))
        .route("/{username}/{post_id}/delete/", post(posts::delete))
        .route("/{username}/{post_id}/comment/", post(posts::comment))
}

pub(crate) fn render(template: &impl Template) -> WebResult<Html<String>> {
    template.render().map(Html).map_err(|e| DomainError::internal(format!("template: {e}")).into())
}

/// `/{username}/{post_id}/`
pub(crate) fn post_path(username: &str, post_id: i64) -> String {
    format!("/{username}/{post_id}/")
}
