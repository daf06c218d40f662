use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{CommentId, PostId};

use crate::dto::{CommentIn, CommentOut, ListQuery, Paginated};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, JsonBody, QueryParams};
use crate::metrics::Event;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<PostId>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Paginated<CommentOut>>> {
    let page = state.comments.list(post_id, query.page_request()).await?;
    Ok(Json(Paginated::from_page(page, CommentOut::from)))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(post_id): Path<PostId>,
    JsonBody(body): JsonBody<CommentIn>,
) -> ApiResult<(StatusCode, Json<CommentOut>)> {
    let view = state.comments.create(&me, post_id, body.text).await?;
    state.metrics.record(Event::CommentCreated);
    Ok((StatusCode::CREATED, Json(view.into())))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path((post_id, id)): Path<(PostId, CommentId)>,
) -> ApiResult<Json<CommentOut>> {
    Ok(Json(state.comments.get(post_id, id).await?.into()))
}

/// PUT and PATCH: the text is the only editable field.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path((post_id, id)): Path<(PostId, CommentId)>,
    JsonBody(body): JsonBody<CommentIn>,
) -> ApiResult<Json<CommentOut>> {
    Ok(Json(state.comments.update(&me, post_id, id, body.text).await?.into()))
}

pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path((post_id, id)): Path<(PostId, CommentId)>,
) -> ApiResult<StatusCode> {
    state.comments.delete(&me, post_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
