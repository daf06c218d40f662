//! Server-side sessions for the rendered surface.
//!
//! The browser only holds an opaque session id; the access token issued at
//! login lives in the session store next to the CSRF token.

use axum::http::request::Parts;
use domains::DomainError;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::debug;

use crate::state::CookiePolicy;

/// Name of the session id cookie.
pub const SESSION_COOKIE: &str = "yatube_session";

const ACCESS_KEY: &str = "access";

pub fn layer(policy: &CookiePolicy) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(policy.secure)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(policy.max_age)))
}

pub(crate) fn store_error(err: tower_sessions::session::Error) -> DomainError {
    DomainError::internal(format!("session: {err}"))
}

/// The session the layer attached to this request, if the route has one.
pub(crate) fn from_parts(parts: &Parts) -> Option<Session> {
    parts.extensions.get::<Session>().cloned()
}

/// The access token stored at login, if any.
pub async fn access_token(session: &Session) -> Result<Option<String>, DomainError> {
    session.get::<String>(ACCESS_KEY).await.map_err(store_error)
}

/// Rotates the session id and binds the access token to it.
pub async fn sign_in(session: &Session, access: String) -> Result<(), DomainError> {
    session.cycle_id().await.map_err(store_error)?;
    session.insert(ACCESS_KEY, access).await.map_err(store_error)
}

/// Drops the whole session, CSRF token included.
pub async fn sign_out(session: &Session) -> Result<(), DomainError> {
    debug!("flushing session");
    session.flush().await.map_err(store_error)
}
