//! Requester extraction from `Authorization: Bearer` or the page session.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use domains::{DomainError, Requester};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

/// The resolved caller. Never rejects for a bad token: that is simply an
/// anonymous request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Requester);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(&parts.headers) {
            Some(token) => Some(token),
            None => match session::from_parts(parts) {
                Some(session) => session::access_token(&session).await?,
                None => None,
            },
        };
        let requester = state.accounts.resolve(token.as_deref()).await?;
        Ok(CurrentUser(requester))
    }
}

/// `Json<T>` whose rejections use the API's `{"detail"}` error body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(DomainError::ValidationError(rejection.body_text()).into()),
        }
    }
}

/// `Query<T>` with the same error body as [`JsonBody`].
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => Err(DomainError::ValidationError(rejection.body_text()).into()),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    (scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty()).then(|| token.trim().to_string())
}
