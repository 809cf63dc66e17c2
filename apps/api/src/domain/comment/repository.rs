use super::{
    entity::{Comment, CommentFlag},
    errors::CommentError,
};
use crate::domain::{
    shared::pagination::PageWindow, sorting::sorter::SortSpec, target::entity::TargetKey,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Optional columns a comment store may or may not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSchema {
    pub has_public_flag: bool,
    pub has_removed_flag: bool,
}

impl Default for CommentSchema {
    fn default() -> Self {
        Self {
            has_public_flag: true,
            has_removed_flag: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Any,
    RootsOnly,
    RepliesOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentFilter {
    pub target: Option<TargetKey>,
    pub placement: Placement,
    pub tree_ids: Option<Vec<Uuid>>,
    pub public_only: bool,
    pub hide_removed: bool,
}

impl CommentFilter {
    pub fn for_target(target: &TargetKey) -> Self {
        Self {
            target: Some(target.clone()),
            ..Self::default()
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        if let Some(target) = &self.target {
            if comment.target_type != target.type_tag || comment.target_pk != target.primary_key {
                return false;
            }
        }
        let placed = match self.placement {
            Placement::Any => true,
            Placement::RootsOnly => comment.parent_id.is_none(),
            Placement::RepliesOnly => comment.parent_id.is_some(),
        };
        placed
            && self
                .tree_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&comment.tree_id))
            && (!self.public_only || comment.is_public)
            && (!self.hide_removed || !comment.is_removed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOrder {
    Sorted(SortSpec),
    /// `(tree_id, path)`: each thread in turn, parents before children.
    DepthFirst,
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    fn schema(&self) -> CommentSchema;
    async fn ping(&self) -> Result<(), CommentError>;
    async fn find(
        &self,
        filter: &CommentFilter,
        order: &CommentOrder,
        window: Option<PageWindow>,
    ) -> Result<Vec<Comment>, CommentError>;
    async fn count(&self, filter: &CommentFilter) -> Result<i64, CommentError>;
    async fn get(&self, id: Uuid) -> Result<Option<Comment>, CommentError>;
    /// Comments on `target` submitted in `[from, to)`, regardless of visibility.
    async fn find_submitted_between(
        &self,
        target: &TargetKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Comment>, CommentError>;
    async fn insert(&self, comment: &Comment) -> Result<Comment, CommentError>;
    async fn update(&self, comment: &Comment) -> Result<Comment, CommentError>;
    /// Returns the flag and whether it was created by this call.
    async fn get_or_create_flag(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        flag: &str,
    ) -> Result<(CommentFlag, bool), CommentError>;
}
