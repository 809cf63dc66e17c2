use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use comment_threads::{
    config::Config,
    domain::target::{
        entity::{KeyFormat, TypeTag},
        registry::TargetRegistry,
    },
    infrastructure::{
        repositories::memory_comment_repository::MemoryCommentRepository,
        targets::static_target_kind::StaticTargetKind,
    },
    presentation::http::{
        middleware::user::UserClaims,
        routes::create_router,
        state::{AppState, default_observers, sort_registry},
    },
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const ARTICLE: &str = "blog.article";

pub struct TestApp {
    pub app: Router,
    pub repo: Arc<MemoryCommentRepository>,
}

pub fn build_config(debug: bool) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        secret_key: "test-secret-key".to_string(),
        debug,
        comment_max_length: 3000,
        comments_per_page: 2,
        comments_hide_removed: true,
        comments_allow_profanities: false,
        profanities: Vec::new(),
        allow_anonymous_comments: true,
        enable_auto_moderation: true,
        moderation_veto_score: 80,
        comment_targets: Vec::new(),
        comment_sorts: None,
        ignore_missing_migrations: true,
    }
}

pub fn spawn_app_with(config: Config) -> TestApp {
    let repo = Arc::new(MemoryCommentRepository::new());
    let mut targets = TargetRegistry::new();
    targets.register(
        TypeTag::parse(ARTICLE).expect("valid tag"),
        Arc::new(StaticTargetKind::new(
            KeyFormat::Integer,
            "/articles/{pk}/",
            ["42", "43"],
        )),
    );
    let sorts = sort_registry(&config).expect("valid sorts");
    let observers = default_observers(&config);
    let state = AppState::new(config, repo.clone(), targets, sorts, observers)
        .expect("failed to build state");

    TestApp {
        app: create_router(state),
        repo,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(build_config(false))
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub async fn read_text(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("invalid utf8")
}

pub async fn expect_status(
    res: axum::response::Response,
    expected: StatusCode,
) -> axum::response::Response {
    let actual = res.status();
    if actual == expected {
        return res;
    }

    let body = read_text(res).await;
    panic!(
        "HTTP status mismatch. Expected {}, got {}. Response body: {}",
        expected, actual, body
    );
}

pub fn user_token(id: Uuid, role: &str) -> String {
    let claims = UserClaims {
        sub: id.to_string(),
        email: format!("user-{}@example.com", id.simple()),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        name: "Test User".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to sign token")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

/// Fetches the form at `form_uri` and returns its security fields.
pub async fn fetch_form(app: &Router, form_uri: &str, token: Option<&str>) -> Value {
    let res = expect_status(send(app, get(form_uri, token)).await, StatusCode::OK).await;
    let body: Value = read_json(res).await;
    body["form"].clone()
}

/// Renders the form, fills it in and posts it to the form's action URL.
pub async fn post_through_form(
    app: &Router,
    form_uri: &str,
    fields: Value,
    token: Option<&str>,
) -> axum::response::Response {
    let form = fetch_form(app, form_uri, token).await;
    let mut body = json!({
        "timestamp": form["timestamp"],
        "security_hash": form["security_hash"],
    });
    if let (Some(target), Some(extra)) = (body.as_object_mut(), fields.as_object()) {
        target.extend(extra.clone());
    }
    let action = form["action_url"].as_str().expect("missing action_url");
    send(app, post_json(action, &body, token)).await
}

pub async fn post_comment(app: &Router, form_uri: &str, text: &str) -> Value {
    let res = post_through_form(
        app,
        form_uri,
        json!({ "user_name": "Ada", "user_email": "ada@example.com", "comment": text }),
        None,
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    read_json(res).await
}
