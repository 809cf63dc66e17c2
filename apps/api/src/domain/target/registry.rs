use super::entity::{KeyFormat, TargetObject, TypeTag};
use crate::domain::comment::errors::CommentError;
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};

/// One kind of host entity that can carry comments.
#[async_trait]
pub trait TargetKind: Send + Sync {
    fn key_format(&self) -> KeyFormat;

    /// Fetches the instance stored under `primary_key`, if any.
    async fn resolve(&self, primary_key: &str) -> Result<Option<TargetObject>, CommentError>;

    fn absolute_url(&self, primary_key: &str) -> String;
}

/// Lookup table from type tag to target kind.
#[derive(Default, Clone)]
pub struct TargetRegistry {
    kinds: HashMap<TypeTag, Arc<dyn TargetKind>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: TypeTag, kind: Arc<dyn TargetKind>) -> &mut Self {
        tracing::debug!(type_tag = %tag, "registered comment target kind");
        self.kinds.insert(tag, kind);
        self
    }

    pub fn get(&self, tag: &TypeTag) -> Option<Arc<dyn TargetKind>> {
        self.kinds.get(tag).cloned()
    }

    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.kinds.keys().map(ToString::to_string).collect();
        tags.sort();
        tags
    }
}
