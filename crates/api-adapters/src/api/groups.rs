use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::NewGroup;

use crate::dto::GroupOut;
use crate::error::ApiResult;
use crate::extract::{CurrentUser, JsonBody};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<GroupOut>>> {
    let groups = state.groups.list().await?;
    Ok(Json(groups.into_iter().map(GroupOut::from).collect()))
}

pub async fn retrieve(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Json<GroupOut>> {
    Ok(Json(state.groups.get(&slug).await?.into()))
}

/// Staff only.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    JsonBody(body): JsonBody<NewGroup>,
) -> ApiResult<(StatusCode, Json<GroupOut>)> {
    let group = state.groups.create(&me, body).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

/// Staff only. Posts of the group survive without a group.
pub async fn destroy(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    state.groups.delete(&me, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
