//! Shared harness: the full router over a `MemoryStore`, driven with
//! `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::sync::Arc;

use api_adapters::{build_router, AppState, CookiePolicy};
use auth_adapters::{Argon2Hasher, JwtConfig, JwtTokenService};
use axum::body::{to_bytes, Body};
use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use domains::{TokenService, User};
use secrecy::SecretString;
use serde_json::Value;
use services::{AccountService, Repositories};
use storage_adapters::MemoryStore;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    tokens: Arc<JwtTokenService>,
}

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::from_store(store.clone());
        let tokens = Arc::new(JwtTokenService::new(&JwtConfig {
            secret: SecretString::from("integration-secret".to_string()),
            access_ttl: chrono::Duration::minutes(5),
            refresh_ttl: chrono::Duration::days(1),
        }));
        let accounts = AccountService::new(&repos, Arc::new(Argon2Hasher::new()), tokens.clone());
        let state = AppState::new(&repos, accounts, CookiePolicy { secure: false, max_age: 300 });
        let router = build_router(state, std::env::temp_dir());
        Self { router, store, tokens }
    }

    /// Creates a user directly in the store and returns an access token.
    pub fn user(&self, username: &str) -> String {
        let user = self.store.insert_user(username, "unused-hash", false).unwrap();
        self.token_for(&user)
    }

    pub fn staff(&self, username: &str) -> String {
        let user = self.store.insert_user(username, "unused-hash", true).unwrap();
        self.token_for(&user)
    }

    fn token_for(&self, user: &User) -> String {
        self.tokens.issue(user).unwrap().access
    }

    async fn send(&self, request: Request<Body>) -> Reply {
        let response: Response<Body> = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let header = |name: HeaderName| {
            response.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
        };
        let location = header(LOCATION);
        let set_cookie = header(SET_COOKIE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply { status, location, set_cookie, body: String::from_utf8_lossy(&bytes).into_owned() }
    }

    /// JSON request against the REST surface.
    pub async fn api(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Page request authenticated by header, so form posts skip the CSRF
    /// check. Use [`Browser`] for cookie sessions.
    pub async fn page(&self, method: Method, uri: &str, token: Option<&str>, form: Option<&str>) -> Reply {
        let mut builder = Request::builder().method(method.clone()).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if method == Method::POST {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        }
        let body = Body::from(form.unwrap_or_default().to_string());
        self.send(builder.body(body).unwrap()).await
    }

    pub fn browser(&self) -> Browser<'_> {
        Browser { app: self, cookie: None, csrf: None }
    }

    /// Publishes a post through the API and returns its id.
    pub async fn post(&self, token: &str, text: &str, group: Option<i64>) -> i64 {
        let reply = self
            .api(Method::POST, "/api/v1/posts/", Some(token), Some(serde_json::json!({ "text": text, "group": group })))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.json()["id"].as_i64().unwrap()
    }

    pub async fn group(&self, staff_token: &str, slug: &str) -> i64 {
        let reply = self
            .api(
                Method::POST,
                "/api/v1/groups/",
                Some(staff_token),
                Some(serde_json::json!({ "title": slug.to_uppercase(), "slug": slug })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.json()["id"].as_i64().unwrap()
    }
}

/// A cookie-carrying client: keeps the session cookie and the last CSRF
/// token seen in a page.
pub struct Browser<'a> {
    app: &'a TestApp,
    cookie: Option<String>,
    pub csrf: Option<String>,
}

impl Browser<'_> {
    async fn request(&mut self, method: Method, uri: &str, form: Option<String>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie.as_str());
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };
        let reply = self.app.send(builder.body(body).unwrap()).await;
        if let Some(set) = &reply.set_cookie {
            let pair = set.split(';').next().unwrap_or_default().trim().to_string();
            self.cookie = pair.split_once('=').filter(|(_, v)| !v.is_empty()).map(|_| pair.clone());
        }
        if let Some(token) = csrf_in(&reply.body) {
            self.csrf = Some(token);
        }
        reply
    }

    pub async fn get(&mut self, uri: &str) -> Reply {
        self.request(Method::GET, uri, None).await
    }

    /// Posts `form` plus the current CSRF token.
    pub async fn submit(&mut self, uri: &str, form: &str) -> Reply {
        let token = self.csrf.clone().unwrap_or_default();
        let body = if form.is_empty() { format!("csrf_token={token}") } else { format!("{form}&csrf_token={token}") };
        self.request(Method::POST, uri, Some(body)).await
    }

    /// Posts `form` as is, without a CSRF token.
    pub async fn submit_bare(&mut self, uri: &str, form: &str) -> Reply {
        self.request(Method::POST, uri, Some(form.to_string())).await
    }

    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }
}

fn csrf_in(body: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = body.find(marker)? + marker.len();
    let end = body[start..].find('"')?;
    Some(body[start..start + end].to_string())
}
