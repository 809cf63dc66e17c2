use super::helpers::{
    build_config, expect_status, fetch_form, get, post_comment, post_json, post_through_form,
    read_json, send, spawn_app, spawn_app_with, user_token,
};
use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use uuid::Uuid;

const NEW_ON_ARTICLE: &str = "/comments/new/blog.article/42";

#[tokio::test]
async fn form_post_and_list_round_trip() {
    let app = spawn_app();

    let form = fetch_form(&app.app, NEW_ON_ARTICLE, None).await;
    assert_eq!(form["title"], "Post new comment");
    assert_eq!(form["action_url"], NEW_ON_ARTICLE);
    assert_eq!(form["security_hash"].as_str().map(str::len), Some(64));

    let saved = post_comment(&app.app, NEW_ON_ARTICLE, "First!").await;
    assert_eq!(saved["duplicate"], false);
    let id = saved["comment"]["id"].as_str().expect("missing id").to_string();
    assert_eq!(saved["redirect"], format!("/comments/posted?c={}", id));

    let res = send(&app.app, get("/comments/list/blog.article/42", None)).await;
    let listing: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(listing["comments"][0]["id"], id.as_str());
    assert_eq!(listing["comments"][0]["body"], "First!");
    assert_eq!(listing["templates"][0], "comments/blog/article/list.html");
    assert_eq!(listing["page"]["total"], 1);

    let res = send(&app.app, get(&format!("/comments/posted?c={}", id), None)).await;
    let posted: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(posted["comment"]["id"], id.as_str());
    assert_eq!(posted["templates"][0], "comments/posted.html");
}

#[tokio::test]
async fn replies_join_the_parent_thread() {
    let app = spawn_app();
    let root = post_comment(&app.app, NEW_ON_ARTICLE, "Root").await;
    let root_id = root["comment"]["id"].as_str().expect("missing id").to_string();

    let reply_uri = format!("/comments/reply/{}", root_id);
    let form = fetch_form(&app.app, &reply_uri, None).await;
    assert_eq!(form["title"], "Post a reply");
    assert_eq!(form["parent_pk"], root_id.as_str());
    assert_eq!(form["object_pk"], "42");

    let reply = post_comment(&app.app, &reply_uri, "Reply").await;
    assert_eq!(reply["comment"]["parent_id"], root_id.as_str());
    assert_eq!(reply["comment"]["level"], 1);

    let res = send(&app.app, get("/comments/list/blog.article/42", None)).await;
    let listing: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    let roots = listing["comments"].as_array().expect("comments array");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["body"], "Reply");

    let res = send(&app.app, get("/comments/count/blog.article/42", None)).await;
    let count: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(count["count"], 2);
}

#[tokio::test]
async fn identical_post_on_the_same_day_is_deduplicated() {
    let app = spawn_app();
    let first = post_comment(&app.app, NEW_ON_ARTICLE, "Same words").await;
    let second = post_comment(&app.app, NEW_ON_ARTICLE, "Same words").await;

    assert_eq!(second["duplicate"], true);
    assert_eq!(second["comment"]["id"], first["comment"]["id"]);
}

#[tokio::test]
async fn preview_and_field_errors_are_not_saved() {
    let app = spawn_app();

    let res = post_through_form(
        &app.app,
        NEW_ON_ARTICLE,
        json!({ "user_name": "Ada", "comment": "Draft", "preview": true }),
        None,
    )
    .await;
    let preview: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(preview["preview"], true);
    assert_eq!(preview["draft"]["body"], "Draft");
    assert_eq!(preview["templates"][0], "comments/blog_article_preview.html");

    let res = post_through_form(
        &app.app,
        NEW_ON_ARTICLE,
        json!({ "user_email": "not-an-email", "comment": "" }),
        None,
    )
    .await;
    let invalid: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    let fields: Vec<&str> = invalid["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"user_email"));
    assert!(fields.contains(&"comment"));

    let res = send(&app.app, get("/comments/count/blog.article/42", None)).await;
    let count: Value = read_json(res).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn tampered_hash_is_a_bad_request() {
    let app = spawn_app();
    let form = fetch_form(&app.app, NEW_ON_ARTICLE, None).await;

    // Token issued for #42, replayed against #43.
    let body = json!({
        "timestamp": form["timestamp"],
        "security_hash": form["security_hash"],
        "comment": "Hello",
    });
    let res = send(
        &app.app,
        post_json("/comments/new/blog.article/43", &body, None),
    )
    .await;
    let error: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert_eq!(error["error"], "Comment post not allowed");
}

#[tokio::test]
async fn debug_deployments_expose_the_reason() {
    let app = spawn_app_with(build_config(true));

    let body = json!({ "content_type": "blog.article", "comment": "Hello" });
    let res = send(&app.app, post_json("/comments/post", &body, None)).await;
    let error: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert_eq!(error["error"], "Missing content_type or object_pk field");

    let body = json!({ "content_type": "shop.product", "object_pk": "1", "comment": "Hi" });
    let res = send(&app.app, post_json("/comments/post", &body, None)).await;
    let error: Value = read_json(expect_status(res, StatusCode::BAD_REQUEST).await).await;
    assert!(
        error["error"]
            .as_str()
            .is_some_and(|m| m.contains("does not resolve to a known kind"))
    );
}

#[tokio::test]
async fn honeypot_rejects_the_post() {
    let app = spawn_app();
    let res = post_through_form(
        &app.app,
        NEW_ON_ARTICLE,
        json!({ "comment": "Buy now", "honeypot": "gotcha" }),
        None,
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn only_the_author_or_a_moderator_can_edit() {
    let app = spawn_app();
    let author = Uuid::now_v7();
    let token = user_token(author, "user");

    let res = post_through_form(
        &app.app,
        NEW_ON_ARTICLE,
        json!({ "comment": "Original" }),
        Some(&token),
    )
    .await;
    let saved: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(saved["comment"]["user_name"], "Test User");
    let id = saved["comment"]["id"].as_str().expect("missing id").to_string();
    let edit_uri = format!("/comments/edit/{}", id);

    let res = send(&app.app, get(&edit_uri, None)).await;
    expect_status(res, StatusCode::UNAUTHORIZED).await;

    let stranger = user_token(Uuid::now_v7(), "user");
    let res = send(&app.app, get(&edit_uri, Some(&stranger))).await;
    expect_status(res, StatusCode::UNAUTHORIZED).await;

    let form = fetch_form(&app.app, &edit_uri, Some(&token)).await;
    assert_eq!(form["title"], "Edit comment");
    assert_eq!(form["initial"]["comment"], "Original");

    let res = post_through_form(
        &app.app,
        &edit_uri,
        json!({ "comment": "Edited" }),
        Some(&token),
    )
    .await;
    let edited: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(edited["comment"]["id"], id.as_str());
    assert_eq!(edited["comment"]["body"], "Edited");

    let moderator = user_token(Uuid::now_v7(), "moderator");
    let res = post_through_form(
        &app.app,
        &edit_uri,
        json!({ "comment": "Moderated" }),
        Some(&moderator),
    )
    .await;
    let moderated: Value = read_json(expect_status(res, StatusCode::OK).await).await;
    assert_eq!(moderated["comment"]["body"], "Moderated");
    assert_eq!(app.repo.flags().await.len(), 2);
}

#[tokio::test]
async fn auto_moderation_vetoes_abusive_posts() {
    let app = spawn_app();
    let shouting = "CLICK HERE http://a.example http://b.example http://c.example FREE MONEY!!!!!!";
    let res = post_through_form(
        &app.app,
        NEW_ON_ARTICLE,
        json!({ "comment": shouting }),
        None,
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn view_redirects_to_the_permalink() {
    let app = spawn_app();
    let saved = post_comment(&app.app, NEW_ON_ARTICLE, "Permalink me").await;
    let id = saved["comment"]["id"].as_str().expect("missing id").to_string();

    let res = send(&app.app, get(&format!("/comments/view/{}", id), None)).await;
    let res = expect_status(res, StatusCode::SEE_OTHER).await;
    assert_eq!(
        res.headers()[header::LOCATION],
        format!("/articles/42/#comment-{}", id).as_str()
    );

    let res = send(
        &app.app,
        get(&format!("/comments/view/{}", Uuid::now_v7()), None),
    )
    .await;
    expect_status(res, StatusCode::NOT_FOUND).await;
}
