//! # HTTP error mapping
//!
//! [`ApiError`] turns a `DomainError` into a JSON response; [`WebError`]
//! turns it into a redirect or an HTML error page.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use tracing::error;

use crate::templates::{ErrorTemplate, Nav};

fn status_of(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound(..) => StatusCode::NOT_FOUND,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::ValidationError(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The message a client may see. Internal details stay in the logs.
fn public_message(err: &DomainError) -> String {
    match err {
        DomainError::NotFound(..) => "Not found.".to_string(),
        DomainError::Forbidden(_) => "You do not have permission to perform this action.".to_string(),
        DomainError::Unauthorized(_) => "Authentication credentials were not provided or are invalid.".to_string(),
        DomainError::ValidationError(msg) | DomainError::Conflict(msg) => msg.clone(),
        DomainError::Internal(_) => "Internal server error.".to_string(),
    }
}

/// JSON error with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let DomainError::Internal(detail) = &self.0 {
            error!(%detail, "request failed");
        }
        let mut response =
            (status_of(&self.0), Json(json!({ "detail": public_message(&self.0) }))).into_response();
        if matches!(self.0, DomainError::Unauthorized(_)) {
            response
                .headers_mut()
                .insert(axum::http::header::WWW_AUTHENTICATE, axum::http::HeaderValue::from_static("Bearer"));
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error on the rendered surface.
///
/// Anonymous writers are sent to the login page with `next` pointing back
/// at `here`; authenticated non-authors are sent to `read_view`.
#[derive(Debug)]
pub struct WebError {
    pub error: DomainError,
    pub here: Option<String>,
    pub read_view: Option<String>,
}

impl From<DomainError> for WebError {
    fn from(error: DomainError) -> Self {
        Self { error, here: None, read_view: None }
    }
}

impl WebError {
    pub fn at(error: DomainError, here: &str, read_view: &str) -> Self {
        Self { error, here: Some(here.to_string()), read_view: Some(read_view.to_string()) }
    }

    pub fn login_url(next: Option<&str>) -> String {
        match next {
            Some(path) => format!("/auth/login/?next={}", encode_query_value(path)),
            None => "/auth/login/".to_string(),
        }
    }
}

/// Attaches page context to a service result.
pub trait PageContext<T> {
    fn on_page(self, here: &str, read_view: &str) -> Result<T, WebError>;
}

impl<T> PageContext<T> for Result<T, DomainError> {
    fn on_page(self, here: &str, read_view: &str) -> Result<T, WebError> {
        self.map_err(|error| WebError::at(error, here, read_view))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self.error {
            DomainError::Unauthorized(_) => {
                Redirect::to(&WebError::login_url(self.here.as_deref())).into_response()
            }
            DomainError::Forbidden(_) if self.read_view.is_some() => {
                Redirect::to(self.read_view.as_deref().unwrap_or("/")).into_response()
            }
            err => {
                if let DomainError::Internal(detail) = &err {
                    error!(%detail, "page failed");
                }
                let status = status_of(&err);
                let page = ErrorTemplate {
                    nav: Nav::default(),
                    title: status.canonical_reason().unwrap_or("Error").to_string(),
                    message: public_message(&err),
                };
                match page.render() {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(e) => {
                        error!(error = %e, "error page failed to render");
                        status.into_response()
                    }
                }
            }
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;

/// Percent-encodes a path for use as a query value.
pub(crate) fn encode_query_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
