use crate::domain::{
    comment::{entity::Comment, validation::ValidationResult},
    target::entity::TargetRef,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Column widths of the stored author fields.
pub const MAX_USER_NAME_LENGTH: usize = 50;
pub const MAX_USER_EMAIL_LENGTH: usize = 254;
pub const MAX_USER_URL_LENGTH: usize = 200;

/// Fields posted by a comment form.
#[derive(Debug, Clone, Default, Deserialize, Validate, TS)]
#[ts(export)]
pub struct CommentSubmission {
    pub content_type: Option<String>,
    pub object_pk: Option<String>,
    pub parent_pk: Option<Uuid>,
    pub timestamp: Option<i64>,
    pub security_hash: Option<String>,
    #[validate(length(max = 50, message = "Ensure this value has at most 50 characters."))]
    pub user_name: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this value has at most 254 characters.")
    )]
    pub user_email: Option<String>,
    #[validate(
        url(message = "Enter a valid URL."),
        length(max = 200, message = "Ensure this value has at most 200 characters.")
    )]
    pub user_url: Option<String>,
    #[serde(default)]
    pub comment: String,
    pub honeypot: Option<String>,
    #[serde(default)]
    pub preview: bool,
    pub next: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CommentSubmission {
    /// Trims text fields; blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            content_type: clean(self.content_type),
            object_pk: clean(self.object_pk),
            security_hash: clean(self.security_hash),
            user_name: clean(self.user_name),
            user_email: clean(self.user_email),
            user_url: clean(self.user_url),
            comment: self.comment.trim().to_string(),
            honeypot: self.honeypot.filter(|v| !v.is_empty()),
            next: clean(self.next),
            ..self
        }
    }
}

/// Editable fields pre-filled into a form.
#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export)]
pub struct FormInitial {
    pub user_name: String,
    pub user_email: String,
    pub user_url: String,
    pub comment: String,
}

/// Everything a client needs to render a comment form.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CommentForm {
    pub content_type: String,
    pub object_pk: String,
    pub timestamp: i64,
    pub security_hash: String,
    pub parent_pk: Option<Uuid>,
    pub action_url: String,
    pub title: String,
    pub target: TargetRef,
    pub initial: FormInitial,
}

#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Saved(Comment),
    /// An identical comment from the same author already exists today.
    Duplicate(Comment),
    Preview(ValidationResult),
}

impl SubmissionOutcome {
    pub fn comment(&self) -> &Comment {
        match self {
            Self::Saved(comment) | Self::Duplicate(comment) => comment,
            Self::Preview(result) => &result.draft,
        }
    }
}
