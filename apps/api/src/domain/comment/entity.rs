use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::ipnetwork::IpNetwork;
use ts_rs::TS;
use uuid::Uuid;

use crate::domain::target::entity::TargetKey;

/// Flag recorded every time a comment is edited.
pub const EDIT_FLAG: &str = "comment edited";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub target_type: String,
    pub target_pk: String,
    pub parent_id: Option<Uuid>,
    /// Id of the root comment; shared by the whole thread.
    pub tree_id: Uuid,
    pub level: i32,
    /// Ancestor ids (simple hex form) joined by `/`, ending with this comment's id.
    /// Sorting by `(tree_id, path)` yields depth-first order.
    #[ts(skip)]
    #[serde(skip)]
    pub path: String,
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub user_email: String,
    pub user_url: String,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
    #[ts(skip)]
    #[serde(skip)]
    pub ip_address: Option<IpNetwork>,
    pub is_public: bool,
    pub is_removed: bool,
}

impl Comment {
    /// Unsaved comment for `target`, placed at the root of its own thread.
    pub fn draft(target: &TargetKey, submitted_at: DateTime<Utc>) -> Self {
        let id = Uuid::now_v7();
        Self {
            id,
            target_type: target.type_tag.clone(),
            target_pk: target.primary_key.clone(),
            parent_id: None,
            tree_id: id,
            level: 0,
            path: id.simple().to_string(),
            user_id: None,
            user_name: String::new(),
            user_email: String::new(),
            user_url: String::new(),
            body: String::new(),
            submitted_at,
            ip_address: None,
            is_public: true,
            is_removed: false,
        }
    }

    /// Moves this comment under `parent`, inheriting its thread.
    pub fn attach_to(&mut self, parent: &Comment) {
        self.parent_id = Some(parent.id);
        self.tree_id = parent.tree_id;
        self.level = parent.level + 1;
        self.path = format!("{}/{}", parent.path, self.id.simple());
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn target_key(&self) -> TargetKey {
        TargetKey::new(&self.target_type, &self.target_pk)
    }

    /// Submission time at the integer-second resolution used by form tokens.
    pub fn submit_timestamp(&self) -> i64 {
        self.submitted_at.timestamp()
    }

    pub fn author(&self) -> AuthorIdentity {
        AuthorIdentity {
            user_id: self.user_id,
            name: self.user_name.clone(),
            email: self.user_email.clone(),
            url: self.user_url.clone(),
        }
    }
}

/// Who wrote a comment: a user reference, or free text for anonymous authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub url: String,
}

impl AuthorIdentity {
    pub fn matches(&self, other: &AuthorIdentity) -> bool {
        match (self.user_id, other.user_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                self.name == other.name && self.email == other.email && self.url == other.url
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
pub struct CommentFlag {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub flag: String,
    pub flagged_at: DateTime<Utc>,
}
