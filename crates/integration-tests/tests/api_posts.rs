mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn author_comes_from_the_token_not_the_body() {
    let app = TestApp::new();
    let leo = app.user("leo");
    app.user("mia");

    let reply = app
        .api(Method::POST, "/api/v1/posts/", Some(&leo), Some(json!({ "text": "hello", "author": "mia" })))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["author"], "leo");
}

#[tokio::test]
async fn anonymous_cannot_publish_but_can_read() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let id = app.post(&leo, "public words", None).await;

    let reply = app.api(Method::POST, "/api/v1/posts/", None, Some(json!({ "text": "x" }))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app.api(Method::GET, &format!("/api/v1/posts/{id}/"), None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["text"], "public words");
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let reply = app.api(Method::POST, "/api/v1/posts/", Some(&leo), Some(json!({ "text": "   " }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_group_is_a_validation_error() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let reply = app
        .api(Method::POST, "/api/v1/posts/", Some(&leo), Some(json!({ "text": "x", "group": 99 })))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_author_may_edit_or_delete() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let mia = app.user("mia");
    let id = app.post(&leo, "original", None).await;
    let uri = format!("/api/v1/posts/{id}/");

    let reply = app.api(Method::PATCH, &uri, Some(&mia), Some(json!({ "text": "hijacked" }))).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.api(Method::DELETE, &uri, Some(&mia), None).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.api(Method::PATCH, &uri, None, Some(json!({ "text": "anon" }))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app.api(Method::GET, &uri, None, None).await;
    assert_eq!(reply.json()["text"], "original");

    let reply = app.api(Method::PATCH, &uri, Some(&leo), Some(json!({ "text": "edited" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["text"], "edited");
    assert_eq!(reply.json()["author"], "leo");

    let reply = app.api(Method::DELETE, &uri, Some(&leo), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    let reply = app.api(Method::GET, &uri, None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_replaces_and_patch_keeps_absent_fields() {
    let app = TestApp::new();
    let admin = app.staff("admin");
    let leo = app.user("leo");
    let cats = app.group(&admin, "cats").await;
    let id = app.post(&leo, "meow", Some(cats)).await;
    let uri = format!("/api/v1/posts/{id}/");

    let reply = app.api(Method::PATCH, &uri, Some(&leo), Some(json!({ "text": "purr" }))).await;
    assert_eq!(reply.json()["group"], cats);

    let reply = app.api(Method::PUT, &uri, Some(&leo), Some(json!({ "text": "plain" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["group"], serde_json::Value::Null);
}

#[tokio::test]
async fn feed_is_newest_first_and_paginated() {
    let app = TestApp::new();
    let leo = app.user("leo");
    for n in 0..13 {
        app.post(&leo, &format!("post {n}"), None).await;
    }

    let first = app.api(Method::GET, "/api/v1/posts/", None, None).await.json();
    assert_eq!(first["count"], 13);
    assert_eq!(first["num_pages"], 2);
    assert_eq!(first["results"].as_array().unwrap().len(), 10);
    assert_eq!(first["results"][0]["text"], "post 12");
    assert_eq!(first["next"], 2);
    assert_eq!(first["previous"], serde_json::Value::Null);

    let last = app.api(Method::GET, "/api/v1/posts/?page=99", None, None).await.json();
    assert_eq!(last["page"], 2);
    assert_eq!(last["results"].as_array().unwrap().len(), 3);

    let garbage = app.api(Method::GET, "/api/v1/posts/?page=abc", None, None).await.json();
    assert_eq!(garbage["page"], 1);
}

#[tokio::test]
async fn search_filters_the_global_feed() {
    let app = TestApp::new();
    let leo = app.user("leo");
    app.post(&leo, "Rust is fun", None).await;
    app.post(&leo, "Gardening notes", None).await;

    let body = app.api(Method::GET, "/api/v1/posts/?search=rust", None, None).await.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["text"], "Rust is fun");
}

#[tokio::test]
async fn comments_belong_to_their_post() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let mia = app.user("mia");
    let first = app.post(&leo, "one", None).await;
    let second = app.post(&leo, "two", None).await;

    let reply = app
        .api(Method::POST, &format!("/api/v1/posts/{first}/comments/"), Some(&mia), Some(json!({ "text": "nice" })))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()["author"], "mia");
    assert_eq!(reply.json()["post"], first);
    let comment = reply.json()["id"].as_i64().unwrap();

    let reply = app.api(Method::GET, &format!("/api/v1/posts/{second}/comments/{comment}/"), None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/posts/{first}/comments/{comment}/");
    let reply = app.api(Method::PATCH, &uri, Some(&leo), Some(json!({ "text": "edited by leo" }))).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.api(Method::PUT, &uri, Some(&mia), Some(json!({ "text": "very nice" }))).await;
    assert_eq!(reply.json()["text"], "very nice");

    let list = app.api(Method::GET, &format!("/api/v1/posts/{first}/comments/"), None, None).await.json();
    assert_eq!(list["count"], 1);

    let reply = app.api(Method::DELETE, &uri, Some(&mia), None).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleting_a_post_removes_its_comments() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let id = app.post(&leo, "short-lived", None).await;
    app.api(Method::POST, &format!("/api/v1/posts/{id}/comments/"), Some(&leo), Some(json!({ "text": "c" })))
        .await;

    app.api(Method::DELETE, &format!("/api/v1/posts/{id}/"), Some(&leo), None).await;
    let reply = app.api(Method::GET, &format!("/api/v1/posts/{id}/comments/"), None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn a_post_read_back_can_be_put_unchanged() {
    let app = TestApp::new();
    let admin = app.staff("admin");
    let leo = app.user("leo");
    let cats = app.group(&admin, "cats").await;
    let id = app.post(&leo, "meow", Some(cats)).await;
    let uri = format!("/api/v1/posts/{id}/");

    let read = app.api(Method::GET, &uri, None, None).await.json();
    let body = json!({ "text": read["text"], "group": read["group"], "image": read["image"] });
    let reply = app.api(Method::PUT, &uri, Some(&leo), Some(body)).await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.json()["group"], cats);
    assert_eq!(reply.json()["text"], "meow");
}

#[tokio::test]
async fn malformed_bodies_and_queries_use_the_detail_shape() {
    let app = TestApp::new();
    let leo = app.user("leo");

    let reply = app.api(Method::POST, "/api/v1/posts/", Some(&leo), Some(json!({ "group": null }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["detail"].as_str().unwrap().contains("text"), "{}", reply.body);

    let reply = app.api(Method::GET, "/api/v1/posts/?published_after=yesterday", None, None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["detail"].is_string(), "{}", reply.body);
}

#[tokio::test]
async fn image_paths_are_validated_before_storage() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let id = app.post(&leo, "pic", None).await;
    let uri = format!("/api/v1/posts/{id}/");

    let long = format!("posts/{}", "a".repeat(101));
    let reply = app.api(Method::PUT, &uri, Some(&leo), Some(json!({ "text": "x", "image": long }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["detail"].is_string());

    let reply = app.api(Method::PATCH, &uri, Some(&leo), Some(json!({ "image": "posts/cat.png" }))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["image"], "posts/cat.png");
}
