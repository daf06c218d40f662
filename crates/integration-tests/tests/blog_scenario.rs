//! End-to-end walk through the core behaviours, across both surfaces.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use domains::{FollowRepository, UserRepository};
use serde_json::json;

#[tokio::test]
async fn publish_edit_group_follow_walkthrough() {
    let app = TestApp::new();
    let admin = app.staff("admin");
    let a = app.user("anna");
    let b = app.user("boris");

    // A publishes; the global feed shows it first.
    app.post(&b, "older post", None).await;
    let hello = app.post(&a, "hello", None).await;
    let feed = app.api(Method::GET, "/api/v1/posts/", None, None).await.json();
    assert_eq!(feed["results"][0]["id"], hello);
    assert_eq!(feed["results"][0]["text"], "hello");

    // B may not edit A's post.
    let reply = app
        .api(Method::PATCH, &format!("/api/v1/posts/{hello}/"), Some(&b), Some(json!({ "text": "mine now" })))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // An empty group is an empty page, not an error.
    app.group(&admin, "news").await;
    let news = app.api(Method::GET, "/api/v1/groups/news/posts/", None, None).await;
    assert_eq!(news.status, StatusCode::OK);
    assert_eq!(news.json()["results"], json!([]));
    let page = app.page(Method::GET, "/group/news/", None, None).await;
    assert_eq!(page.status, StatusCode::OK);

    // Following twice leaves one edge.
    app.page(Method::POST, "/boris/follow/", Some(&a), None).await;
    app.page(Method::POST, "/boris/follow/", Some(&a), None).await;
    let anna = UserRepository::find_by_username(app.store.as_ref(), "anna").await.unwrap().unwrap();
    let boris = UserRepository::find_by_username(app.store.as_ref(), "boris").await.unwrap().unwrap();
    assert!(app.store.exists(anna.id, boris.id).await.unwrap());
    assert_eq!(app.store.count_following(anna.id).await.unwrap(), 1);
    assert_eq!(app.store.count_followers(boris.id).await.unwrap(), 1);

    // Without credentials the subscription feed is refused on both surfaces.
    let reply = app.api(Method::GET, "/api/v1/feed/", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    let page = app.page(Method::GET, "/follow/", None, None).await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);

    // With them, it carries B's posts.
    let feed = app.api(Method::GET, "/api/v1/feed/", Some(&a), None).await.json();
    assert_eq!(feed["results"][0]["author"], "boris");
}

#[tokio::test]
async fn self_follow_never_creates_an_edge() {
    let app = TestApp::new();
    let a = app.user("anna");
    for _ in 0..3 {
        app.page(Method::POST, "/anna/follow/", Some(&a), None).await;
    }
    let anna = UserRepository::find_by_username(app.store.as_ref(), "anna").await.unwrap().unwrap();
    assert!(!app.store.exists(anna.id, anna.id).await.unwrap());
    assert_eq!(app.store.count_following(anna.id).await.unwrap(), 0);
}
