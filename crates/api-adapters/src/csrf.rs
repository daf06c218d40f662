//! CSRF protection for form posts, using a per-session token.
//!
//! Every rendered page carries the token in its forms. Requests that
//! authenticate with an `Authorization` header are exempt: a browser never
//! attaches one cross-site.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Form;
use domains::DomainError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::error::WebError;
use crate::session;
use crate::state::AppState;

const CSRF_KEY: &str = "csrf_token";

fn session_of(parts: &Parts) -> Result<Session, DomainError> {
    session::from_parts(parts).ok_or_else(|| DomainError::internal("session layer missing"))
}

/// Returns the session's token, creating one on first use.
pub async fn token(session: &Session) -> Result<String, DomainError> {
    let existing = session
        .get::<String>(CSRF_KEY)
        .await
        .map_err(session::store_error)?;
    if let Some(token) = existing {
        return Ok(token);
    }
    let token = Uuid::new_v4().simple().to_string();
    session
        .insert(CSRF_KEY, token.clone())
        .await
        .map_err(session::store_error)?;
    Ok(token)
}

/// The token to embed in the page being rendered.
#[derive(Debug, Clone)]
pub struct Csrf(pub String);

impl FromRequestParts<AppState> for Csrf {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_of(parts)?;
        Ok(Csrf(token(&session).await?))
    }
}

/// No fields besides the token: follow, unfollow, delete and logout buttons.
#[derive(Debug, Default, Deserialize)]
pub struct Empty {}

#[derive(Deserialize)]
struct Guarded<T> {
    #[serde(default)]
    csrf_token: String,
    #[serde(flatten)]
    data: T,
}

/// `Form<T>` that also checks the submitted CSRF token.
#[derive(Debug)]
pub struct CsrfForm<T>(pub T);

impl<T> FromRequest<AppState> for CsrfForm<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let exempt = parts.headers.contains_key(AUTHORIZATION);
        let session = session_of(&parts)?;
        let Form(form) = Form::<Guarded<T>>::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| DomainError::ValidationError(e.body_text()))?;
        if !exempt {
            let expected = session
                .get::<String>(CSRF_KEY)
                .await
                .map_err(session::store_error)?;
            if expected.as_deref() != Some(form.csrf_token.as_str()) || form.csrf_token.is_empty() {
                warn!("form post with a missing or stale csrf token");
                return Err(DomainError::Forbidden("CSRF verification failed.".into()).into());
            }
        }
        Ok(CsrfForm(form.data))
    }
}
