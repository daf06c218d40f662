//! # REST surface under `/api/v1`
//!
//! JSON in, JSON out. Errors use the `{"detail": ...}` shape of [`ApiError`](crate::error::ApiError).

mod accounts;
mod comments;
mod feeds;
mod groups;
mod posts;
mod subscriptions;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/token/", post(accounts::obtain_token))
        .route("/token/refresh/", post(accounts::refresh_token))
        .route("/users/", post(accounts::sign_up))
        .route("/users/me/", delete(accounts::delete_me))
        .route("/posts/", get(posts::list).post(posts::create))
        .route(
            "/posts/{id}/",
            get(posts::retrieve).put(posts::replace).patch(posts::patch).delete(posts::destroy),
        )
        .route("/posts/{post_id}/comments/", get(comments::list).post(comments::create))
        .route(
            "/posts/{post_id}/comments/{id}/",
            get(comments::retrieve)
                .put(comments::update)
                .patch(comments::update)
                .delete(comments::destroy),
        )
        .route("/groups/", get(groups::list).post(groups::create))
        .route("/groups/{slug}/", get(groups::retrieve).delete(groups::destroy))
        .route("/groups/{slug}/posts/", get(feeds::group))
        .route("/follow/", get(subscriptions::list).post(subscriptions::create))
        .route("/feed/", get(feeds::subscriptions))
        .route("/profiles/{username}/", get(feeds::profile))
}
