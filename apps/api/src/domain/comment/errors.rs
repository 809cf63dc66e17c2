use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum CommentError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
    #[error("The given content-type {0:?} does not resolve to a known kind")]
    UnknownType(String),
    #[error("No object matching content-type {type_tag:?} and object PK {primary_key:?} exists")]
    TargetNotFound {
        type_tag: String,
        primary_key: String,
    },
    #[error("Object PK {primary_key:?} is not valid for content-type {type_tag:?}")]
    InvalidReference {
        type_tag: String,
        primary_key: String,
    },
    #[error("Missing content_type or object_pk field")]
    MissingTarget,
    #[error("Parent comment with PK {0} does not exist")]
    ParentNotFound(Uuid),
    #[error("Comment with PK {0} does not exist")]
    CommentNotFound(Uuid),
    #[error("The comment form failed security verification: security hash check failed")]
    SecurityHashInvalid,
    #[error("The comment form failed security verification: timestamp check failed")]
    TimestampInvalid,
    #[error("The comment form failed security verification: honeypot field was filled in")]
    SpamHoneypot,
    #[error("Receiver {observer} killed the comment: {reason}")]
    PostRejectedByExtension { observer: String, reason: String },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<sqlx::Error> for CommentError {
    fn from(err: sqlx::Error) -> Self {
        CommentError::Infrastructure(err.to_string())
    }
}
