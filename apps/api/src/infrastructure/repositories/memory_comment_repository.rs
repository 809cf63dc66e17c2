use crate::domain::{
    comment::{
        entity::{Comment, CommentFlag},
        errors::CommentError,
        repository::{CommentFilter, CommentOrder, CommentRepository, CommentSchema},
    },
    shared::pagination::PageWindow,
    target::entity::TargetKey,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Store {
    comments: HashMap<Uuid, Comment>,
    flags: Vec<CommentFlag>,
}

/// In-process comment store for tests and local runs without Postgres.
pub struct MemoryCommentRepository {
    schema: CommentSchema,
    store: RwLock<Store>,
}

impl Default for MemoryCommentRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCommentRepository {
    pub fn new() -> Self {
        Self::with_schema(CommentSchema::default())
    }

    pub fn with_schema(schema: CommentSchema) -> Self {
        Self {
            schema,
            store: RwLock::new(Store::default()),
        }
    }

    pub async fn flags(&self) -> Vec<CommentFlag> {
        self.store.read().await.flags.clone()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    fn schema(&self) -> CommentSchema {
        self.schema
    }

    async fn ping(&self) -> Result<(), CommentError> {
        Ok(())
    }

    async fn find(
        &self,
        filter: &CommentFilter,
        order: &CommentOrder,
        window: Option<PageWindow>,
    ) -> Result<Vec<Comment>, CommentError> {
        let store = self.store.read().await;
        let mut rows: Vec<Comment> = store
            .comments
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        match order {
            CommentOrder::Sorted(spec) => {
                rows.sort_by(|a, b| spec.compare(a, b).then_with(|| a.id.cmp(&b.id)))
            }
            CommentOrder::DepthFirst => {
                rows.sort_by(|a, b| (a.tree_id, &a.path).cmp(&(b.tree_id, &b.path)))
            }
        }
        Ok(match window {
            Some(w) => rows
                .into_iter()
                .skip(w.offset.max(0) as usize)
                .take(w.limit.max(0) as usize)
                .collect(),
            None => rows,
        })
    }

    async fn count(&self, filter: &CommentFilter) -> Result<i64, CommentError> {
        let store = self.store.read().await;
        Ok(store.comments.values().filter(|c| filter.matches(c)).count() as i64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, CommentError> {
        Ok(self.store.read().await.comments.get(&id).cloned())
    }

    async fn find_submitted_between(
        &self,
        target: &TargetKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Comment>, CommentError> {
        let filter = CommentFilter::for_target(target);
        let store = self.store.read().await;
        let mut rows: Vec<Comment> = store
            .comments
            .values()
            .filter(|c| filter.matches(c) && c.submitted_at >= from && c.submitted_at < to)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.submitted_at, c.id));
        Ok(rows)
    }

    async fn insert(&self, comment: &Comment) -> Result<Comment, CommentError> {
        let mut store = self.store.write().await;
        if store.comments.contains_key(&comment.id) {
            return Err(CommentError::Infrastructure(format!(
                "comment {} already exists",
                comment.id
            )));
        }
        store.comments.insert(comment.id, comment.clone());
        Ok(comment.clone())
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, CommentError> {
        let mut store = self.store.write().await;
        match store.comments.get_mut(&comment.id) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(comment.clone())
            }
            None => Err(CommentError::CommentNotFound(comment.id)),
        }
    }

    async fn get_or_create_flag(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        flag: &str,
    ) -> Result<(CommentFlag, bool), CommentError> {
        let mut store = self.store.write().await;
        if let Some(existing) = store
            .flags
            .iter()
            .find(|f| f.comment_id == comment_id && f.user_id == user_id && f.flag == flag)
        {
            return Ok((existing.clone(), false));
        }
        let created = CommentFlag {
            id: Uuid::now_v7(),
            comment_id,
            user_id,
            flag: flag.to_string(),
            flagged_at: Utc::now(),
        };
        store.flags.push(created.clone());
        Ok((created, true))
    }
}
