use crate::presentation::http::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    version: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = match state.comments.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!("Health check failed: comment store unreachable: {}", e);
            "down"
        }
    };

    let (code, status) = if db_status == "up" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database: db_status,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
