mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn only_staff_manage_groups() {
    let app = TestApp::new();
    let admin = app.staff("admin");
    let leo = app.user("leo");

    let reply = app
        .api(Method::POST, "/api/v1/groups/", Some(&leo), Some(json!({ "title": "Cats", "slug": "cats" })))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    app.group(&admin, "cats").await;
    let reply = app
        .api(Method::POST, "/api/v1/groups/", Some(&admin), Some(json!({ "title": "Again", "slug": "cats" })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app
        .api(Method::POST, "/api/v1/groups/", Some(&admin), Some(json!({ "title": "Bad", "slug": "no spaces" })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = app.api(Method::DELETE, "/api/v1/groups/cats/", Some(&leo), None).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let list = app.api(Method::GET, "/api/v1/groups/", None, None).await.json();
    assert_eq!(list[0]["slug"], "cats");
}

#[tokio::test]
async fn group_feed_and_unknown_slug() {
    let app = TestApp::new();
    let admin = app.staff("admin");
    let leo = app.user("leo");
    let cats = app.group(&admin, "cats").await;
    app.group(&admin, "dogs").await;
    app.post(&leo, "meow", Some(cats)).await;
    app.post(&leo, "no group", None).await;

    let feed = app.api(Method::GET, "/api/v1/groups/cats/posts/", None, None).await.json();
    assert_eq!(feed["count"], 1);
    assert_eq!(feed["results"][0]["text"], "meow");

    let empty = app.api(Method::GET, "/api/v1/groups/dogs/posts/", None, None).await.json();
    assert_eq!(empty["results"], json!([]));
    assert_eq!(empty["page"], 1);

    let reply = app.api(Method::GET, "/api/v1/groups/birds/posts/", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_group_keeps_its_posts() {
    let app = TestApp::new();
    let admin = app.staff("admin");
    let leo = app.user("leo");
    let cats = app.group(&admin, "cats").await;
    let id = app.post(&leo, "meow", Some(cats)).await;

    let reply = app.api(Method::DELETE, "/api/v1/groups/cats/", Some(&admin), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let post = app.api(Method::GET, &format!("/api/v1/posts/{id}/"), None, None).await;
    assert_eq!(post.status, StatusCode::OK);
    assert_eq!(post.json()["group"], serde_json::Value::Null);
}
