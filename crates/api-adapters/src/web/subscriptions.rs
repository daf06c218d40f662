use axum::extract::{Path, State};
use axum::response::Redirect;

use crate::csrf::{CsrfForm, Empty};
use crate::error::{PageContext, WebResult};
use crate::extract::CurrentUser;
use crate::metrics::Event;
use crate::state::AppState;

/// Self-follows and repeated follows are silently ignored.
pub async fn follow(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(username): Path<String>,
    CsrfForm(_): CsrfForm<Empty>,
) -> WebResult<Redirect> {
    let profile = format!("/{username}/");
    let outcome = state.subscriptions.follow(&me, &username).await.on_page(&profile, &profile)?;
    if outcome.changed {
        state.metrics.record(Event::FollowCreated);
    }
    Ok(Redirect::to(&format!("/{}/", outcome.author.username)))
}

pub async fn unfollow(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(username): Path<String>,
    CsrfForm(_): CsrfForm<Empty>,
) -> WebResult<Redirect> {
    let profile = format!("/{username}/");
    let outcome = state.subscriptions.unfollow(&me, &username).await.on_page(&profile, &profile)?;
    if outcome.changed {
        state.metrics.record(Event::FollowRemoved);
    }
    Ok(Redirect::to(&format!("/{}/", outcome.author.username)))
}
