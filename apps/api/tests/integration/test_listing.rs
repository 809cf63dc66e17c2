use super::helpers::{expect_status, get, post_comment, read_json, send, spawn_app};
use axum::http::StatusCode;
use serde_json::Value;

const NEW_ON_ARTICLE: &str = "/comments/new/blog.article/42";

async fn bodies(app: &axum::Router, uri: &str) -> Vec<String> {
    let res = expect_status(send(app, get(uri, None)).await, StatusCode::OK).await;
    let listing: Value = read_json(res).await;
    listing["comments"]
        .as_array()
        .expect("comments array")
        .iter()
        .filter_map(|c| c["body"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn health_reports_the_store() {
    let app = spawn_app();
    let res = expect_status(send(&app.app, get("/health", None)).await, StatusCode::OK).await;
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = read_json(res).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn roots_are_sorted_and_paginated() {
    let app = spawn_app();
    for text in ["one", "two", "three"] {
        post_comment(&app.app, NEW_ON_ARTICLE, text).await;
    }

    assert_eq!(
        bodies(&app.app, "/comments/list/blog.article/42?sort=oldest").await,
        ["one", "two"]
    );
    assert_eq!(
        bodies(&app.app, "/comments/list/blog.article/42?sort=oldest&page=2").await,
        ["three"]
    );
    assert_eq!(
        bodies(&app.app, "/comments/list/blog.article/42?sort=newest").await,
        ["three", "two"]
    );
    assert_eq!(
        bodies(&app.app, "/comments/list/blog.article/42?sort=bogus").await,
        ["one", "two"]
    );
    assert!(
        bodies(&app.app, "/comments/list/blog.article/42?page=9")
            .await
            .is_empty()
    );

    let res = send(&app.app, get("/comments/list/blog.article/42?page=2", None)).await;
    let listing: Value = read_json(res).await;
    assert_eq!(listing["sort"], "oldest");
    assert_eq!(listing["page"]["num_pages"], 2);
    assert_eq!(listing["page"]["has_previous"], true);
    assert_eq!(listing["page"]["has_next"], false);
    assert_eq!(listing["sort_options"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn unknown_targets_are_bad_requests() {
    let app = spawn_app();
    for uri in [
        "/comments/list/blog.article/99",
        "/comments/list/shop.product/1",
        "/comments/list/blog.article/not-a-number",
        "/comments/list/notatag/1",
        "/comments/new/blog.article/99",
    ] {
        let res = send(&app.app, get(uri, None)).await;
        expect_status(res, StatusCode::BAD_REQUEST).await;
    }
}

#[tokio::test]
async fn permalinks_carry_the_page() {
    let app = spawn_app();
    let mut ids = Vec::new();
    for text in ["a", "b", "c"] {
        let saved = post_comment(&app.app, NEW_ON_ARTICLE, text).await;
        ids.push(saved["comment"]["id"].as_str().expect("id").to_string());
    }

    let res = send(&app.app, get(&format!("/comments/view/{}", ids[2]), None)).await;
    let res = expect_status(res, StatusCode::SEE_OTHER).await;
    assert_eq!(
        res.headers()["location"],
        format!("/articles/42/?page=2#comment-{}", ids[2]).as_str()
    );
}
