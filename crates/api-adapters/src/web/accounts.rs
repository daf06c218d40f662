use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use domains::{DomainError, Requester};
use serde::Deserialize;
use tower_sessions::Session;

use super::render;
use crate::csrf::{Csrf, CsrfForm, Empty};
use crate::error::WebResult;
use crate::extract::CurrentUser;
use crate::metrics::Event;
use crate::session;
use crate::state::AppState;
use crate::templates::{AuthFormTemplate, Nav};

const BAD_LOGIN: &str = "Please enter a correct username and password.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Only same-site absolute paths are followed after login.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

fn login_page(nav: Nav, next: &str, username: &str, error: &str) -> WebResult<Html<String>> {
    render(&AuthFormTemplate {
        nav,
        heading: "Log in".to_string(),
        action: "/auth/login/".to_string(),
        submit: "Log in".to_string(),
        next: next.to_string(),
        username: username.to_string(),
        error: error.to_string(),
    })
}

fn signup_page(nav: Nav, username: &str, error: &str) -> WebResult<Html<String>> {
    render(&AuthFormTemplate {
        nav,
        heading: "Sign up".to_string(),
        action: "/auth/signup/".to_string(),
        submit: "Create account".to_string(),
        next: String::new(),
        username: username.to_string(),
        error: error.to_string(),
    })
}

pub async fn login_form(
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    Query(query): Query<NextQuery>,
) -> WebResult<Html<String>> {
    login_page(Nav::new(&me, csrf), query.next.as_deref().unwrap_or_default(), "", "")
}

pub async fn login(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    session: Session,
    CsrfForm(form): CsrfForm<AuthForm>,
) -> WebResult<Response> {
    match state.accounts.login(&form.username, &form.password).await {
        Ok(tokens) => {
            session::sign_in(&session, tokens.access).await?;
            Ok(Redirect::to(safe_next(&form.next)).into_response())
        }
        Err(DomainError::Unauthorized(_)) => {
            let page = login_page(Nav::new(&me, csrf), &form.next, &form.username, BAD_LOGIN)?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn logout(session: Session, CsrfForm(_): CsrfForm<Empty>) -> WebResult<Redirect> {
    session::sign_out(&session).await?;
    Ok(Redirect::to("/"))
}

pub async fn signup_form(CurrentUser(me): CurrentUser, Csrf(csrf): Csrf) -> WebResult<Html<String>> {
    signup_page(Nav::new(&me, csrf), "", "")
}

pub async fn signup(
    State(state): State<AppState>,
    CurrentUser(me): CurrentUser,
    Csrf(csrf): Csrf,
    CsrfForm(form): CsrfForm<AuthForm>,
) -> WebResult<Response> {
    match state.accounts.sign_up(&form.username, &form.password).await {
        Ok(_) => {
            state.metrics.record(Event::Signup);
            Ok(Redirect::to("/auth/login/").into_response())
        }
        Err(DomainError::ValidationError(msg) | DomainError::Conflict(msg)) => {
            let page = signup_page(Nav::new(&me, csrf), &form.username, &msg)?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
