use super::{
    handlers::{comments, health},
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Listing
        .route("/comments/list/{ctype}/{pk}", get(comments::list_comments))
        .route("/comments/count/{ctype}/{pk}", get(comments::count_comments))
        // Forms and submissions
        .route(
            "/comments/new/{ctype}/{pk}",
            get(comments::new_comment_form).post(comments::post_new_comment),
        )
        .route(
            "/comments/reply/{parent_id}",
            get(comments::reply_form).post(comments::post_reply),
        )
        .route(
            "/comments/edit/{comment_id}",
            get(comments::edit_form).post(comments::post_edit),
        )
        .route("/comments/post", post(comments::post_comment))
        .route("/comments/posted", get(comments::comment_posted))
        // Permalinks
        .route("/comments/view/{comment_id}", get(comments::view_comment))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
