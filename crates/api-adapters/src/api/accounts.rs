use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::{AccessOut, Credentials, RefreshIn, TokenOut, UserOut};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, JsonBody};
use crate::metrics::Event;
use crate::state::AppState;

pub async fn obtain_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> ApiResult<Json<TokenOut>> {
    let pair = state.accounts.login(&body.username, &body.password).await?;
    Ok(Json(pair.into()))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshIn>,
) -> ApiResult<Json<AccessOut>> {
    let access = state.accounts.refresh(&body.refresh)?;
    Ok(Json(AccessOut { access }))
}

pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Credentials>,
) -> ApiResult<(StatusCode, Json<UserOut>)> {
    let user = state.accounts.sign_up(&body.username, &body.password).await?;
    state.metrics.record(Event::Signup);
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn delete_me(State(state): State<AppState>, CurrentUser(me): CurrentUser) -> ApiResult<StatusCode> {
    state.accounts.delete_account(&me).await?;
    Ok(StatusCode::NO_CONTENT)
}
