use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::PostId;
use services::PostUpdate;

use crate::dto::{ListQuery, Paginated, PostIn, PostOut, PostPatch};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, JsonBody, QueryParams};
use crate::metrics::Event;
use crate::state::AppState;

/// Global feed with optional `search`, `published_after` and `published_before`.
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Paginated<PostOut>>> {
    let page = state.feed.global(&query.post_filter(), query.page_request()).await?;
    Ok(Json(Paginated::from_page(page, PostOut::from)))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    JsonBody(body): JsonBody<PostIn>,
) -> ApiResult<(StatusCode, Json<PostOut>)> {
    let view = state.posts.create(&me, body.into()).await?;
    state.metrics.record(Event::PostCreated);
    Ok((StatusCode::CREATED, Json(view.into())))
}

pub async fn retrieve(State(state): State<AppState>, Path(id): Path<PostId>) -> ApiResult<Json<PostOut>> {
    Ok(Json(state.posts.get(id).await?.into()))
}

pub async fn replace(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<PostId>,
    JsonBody(body): JsonBody<PostIn>,
) -> ApiResult<Json<PostOut>> {
    let view = state.posts.update(&me, id, PostUpdate::replace(body.into())).await?;
    state.metrics.record(Event::PostUpdated);
    Ok(Json(view.into()))
}

pub async fn patch(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<PostId>,
    JsonBody(body): JsonBody<PostPatch>,
) -> ApiResult<Json<PostOut>> {
    let view = state.posts.update(&me, id, body.into()).await?;
    state.metrics.record(Event::PostUpdated);
    Ok(Json(view.into()))
}

pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(id): Path<PostId>,
) -> ApiResult<StatusCode> {
    state.posts.delete(&me, id).await?;
    state.metrics.record(Event::PostDeleted);
    Ok(StatusCode::NO_CONTENT)
}
