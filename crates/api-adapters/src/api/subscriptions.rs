use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{FollowIn, FollowOut, SearchQuery};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, JsonBody, QueryParams};
use crate::metrics::Event;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Json<Vec<FollowOut>>> {
    let edges = state.subscriptions.list(&me, query.search).await?;
    Ok(Json(edges.into_iter().map(FollowOut::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    JsonBody(body): JsonBody<FollowIn>,
) -> ApiResult<(StatusCode, Json<FollowOut>)> {
    let edge = state.subscriptions.subscribe(&me, &body.author).await?;
    state.metrics.record(Event::FollowCreated);
    Ok((StatusCode::CREATED, Json(edge.into())))
}
