mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn subscribe_reports_self_and_duplicate_follows() {
    let app = TestApp::new();
    let leo = app.user("leo");
    app.user("mia");

    let reply = app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": "mia" }))).await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json(), json!({ "user": "leo", "author": "mia" }));

    let reply = app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": "mia" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["detail"], "Subscription to the author is already arranged.");

    let reply = app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": "leo" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["detail"], "You can't subscribe to yourself.");

    let reply = app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": "ghost" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn follow_list_is_private_and_searchable() {
    let app = TestApp::new();
    let leo = app.user("leo");
    app.user("mia");
    app.user("max");
    for author in ["mia", "max"] {
        app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": author }))).await;
    }

    let reply = app.api(Method::GET, "/api/v1/follow/", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let all = app.api(Method::GET, "/api/v1/follow/", Some(&leo), None).await.json();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let some = app.api(Method::GET, "/api/v1/follow/?search=MI", Some(&leo), None).await.json();
    assert_eq!(some, json!([{ "user": "leo", "author": "mia" }]));
}

#[tokio::test]
async fn subscription_feed_contains_only_followed_authors() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let mia = app.user("mia");
    let max = app.user("max");
    app.post(&mia, "from mia", None).await;
    app.post(&max, "from max", None).await;
    app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": "mia" }))).await;

    let feed = app.api(Method::GET, "/api/v1/feed/", Some(&leo), None).await.json();
    assert_eq!(feed["count"], 1);
    assert_eq!(feed["results"][0]["author"], "mia");

    let reply = app.api(Method::GET, "/api/v1/feed/", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let empty = app.api(Method::GET, "/api/v1/feed/", Some(&max), None).await.json();
    assert_eq!(empty["count"], 0);
    assert_eq!(empty["num_pages"], 1);
}

#[tokio::test]
async fn profile_reports_follow_state_and_counts() {
    let app = TestApp::new();
    let leo = app.user("leo");
    let mia = app.user("mia");
    app.post(&mia, "hi", None).await;
    app.api(Method::POST, "/api/v1/follow/", Some(&leo), Some(json!({ "author": "mia" }))).await;

    let profile = app.api(Method::GET, "/api/v1/profiles/mia/", Some(&leo), None).await.json();
    assert_eq!(profile["following"], true);
    assert_eq!(profile["followers_count"], 1);
    assert_eq!(profile["posts"]["count"], 1);
    assert_eq!(profile["followed_by"], false);

    let back = app.api(Method::GET, "/api/v1/profiles/leo/", Some(&mia), None).await.json();
    assert_eq!(back["followed_by"], true);
    assert_eq!(back["following"], false);

    let anonymous = app.api(Method::GET, "/api/v1/profiles/mia/", None, None).await.json();
    assert_eq!(anonymous["following"], false);
    assert_eq!(anonymous["followed_by"], false);

    let reply = app.api(Method::GET, "/api/v1/profiles/ghost/", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}
