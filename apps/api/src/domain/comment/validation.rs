use super::entity::Comment;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Hidden form fields binding a submission to its target and render time.
/// Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SecurityToken {
    pub target_type: String,
    pub target_pk: String,
    pub timestamp: i64,
    pub digest: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    TooLong,
    InvalidEmail,
    InvalidUrl,
    ProfanityRejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub code: FieldErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code,
            message: message.into(),
        }
    }
}

/// A draft that was not saved: either a preview or a submission with field errors.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ValidationResult {
    pub draft: Comment,
    pub errors: Vec<FieldError>,
    pub preview: bool,
    pub token: SecurityToken,
}
