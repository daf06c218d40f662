use axum::extract::{Path, State};
use axum::Json;

use crate::dto::{ListQuery, Paginated, PostOut, ProfileOut};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, QueryParams};
use crate::state::AppState;

pub async fn group(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Paginated<PostOut>>> {
    let (_, page) = state.feed.group(&slug, query.page_request()).await?;
    Ok(Json(Paginated::from_page(page, PostOut::from)))
}

/// Posts by the authors the requester follows. 401 for anonymous callers.
pub async fn subscriptions(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Paginated<PostOut>>> {
    let page = state.feed.subscriptions(&me, query.page_request()).await?;
    Ok(Json(Paginated::from_page(page, PostOut::from)))
}

pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(username): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<ProfileOut>> {
    let feed = state.feed.profile(&me, &username, query.page_request()).await?;
    Ok(Json(feed.into()))
}
