//! HTTP error handling and response conversion.
//!
//! Domain errors are mapped to status codes and a JSON body of the form
//! `{"error": "..."}`. Rejected comment posts become `400 Bad Request`; the
//! rejection reason is only sent to the client when the server runs with
//! `DEBUG=true`, otherwise it is logged and replaced by a generic message.

use crate::domain::comment::errors::CommentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404).
    NotFound(String),

    /// A comment post or form request the server refuses to act on (400).
    CommentPostBadRequest { why: String, expose: bool },

    /// The actor lacks the capability for this operation (401).
    Unauthorized,

    /// Database operation failed (500).
    Database(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::CommentPostBadRequest { why, .. } => write!(f, "Bad comment post: {}", why),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl AppError {
    /// Maps a comment subsystem error; `debug` decides whether bad-request
    /// reasons reach the client.
    pub fn from_comment_error(err: CommentError, debug: bool) -> Self {
        match err {
            CommentError::CommentNotFound(id) => {
                AppError::NotFound(format!("comment {}", id))
            }
            CommentError::Unauthorized => AppError::Unauthorized,
            CommentError::Infrastructure(msg) => {
                tracing::error!(infrastructure_error = %msg);
                AppError::Database(msg)
            }
            other => AppError::CommentPostBadRequest {
                why: other.to_string(),
                expose: debug,
            },
        }
    }

    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CommentPostBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-safe error message (without implementation details).
    fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Resource not found".into(),
            Self::CommentPostBadRequest { why, expose: true } => why.clone(),
            Self::CommentPostBadRequest { expose: false, .. } => "Comment post not allowed".into(),
            Self::Unauthorized => "Unauthorized".into(),
            Self::Database(_) => "Database operation failed".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("error={}", self);
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
                tracing::warn!("error={}", self);
            }
            _ => {
                tracing::info!("error={}", self);
            }
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
