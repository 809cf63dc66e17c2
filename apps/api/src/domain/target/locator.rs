use super::{
    entity::{TargetKey, TargetRef, TypeTag},
    registry::TargetRegistry,
};
use crate::domain::comment::{
    entity::Comment, errors::CommentError, repository::CommentRepository,
};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// How a submission names the thing it comments on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    Explicit { type_tag: String, primary_key: String },
    Parent(Uuid),
}

impl TargetSpec {
    /// Builds a spec from raw request fields. A parent wins over an explicit
    /// type and key, since replies always follow their thread's target.
    pub fn from_parts(
        type_tag: Option<&str>,
        primary_key: Option<&str>,
        parent_id: Option<Uuid>,
    ) -> Result<Self, CommentError> {
        if let Some(parent_id) = parent_id {
            return Ok(Self::Parent(parent_id));
        }
        match (non_blank(type_tag), non_blank(primary_key)) {
            (Some(type_tag), Some(primary_key)) => Ok(Self::Explicit {
                type_tag: type_tag.to_string(),
                primary_key: primary_key.to_string(),
            }),
            _ => Err(CommentError::MissingTarget),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Target resolved for a submission, with the parent comment when replying.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub target: TargetRef,
    pub parent: Option<Comment>,
}

/// Resolves opaque target references to concrete host entities.
pub struct ContentLocator {
    registry: Arc<TargetRegistry>,
    comments: Arc<dyn CommentRepository>,
}

impl ContentLocator {
    pub fn new(registry: Arc<TargetRegistry>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { registry, comments }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, type_tag: &str, primary_key: &str) -> Result<TargetRef, CommentError> {
        let tag =
            TypeTag::parse(type_tag).ok_or_else(|| CommentError::UnknownType(type_tag.to_string()))?;
        let kind = self
            .registry
            .get(&tag)
            .ok_or_else(|| CommentError::UnknownType(type_tag.to_string()))?;

        if !kind.key_format().accepts(primary_key) {
            return Err(CommentError::InvalidReference {
                type_tag: tag.to_string(),
                primary_key: primary_key.to_string(),
            });
        }

        let object = kind
            .resolve(primary_key.trim())
            .await?
            .ok_or_else(|| CommentError::TargetNotFound {
                type_tag: tag.to_string(),
                primary_key: primary_key.to_string(),
            })?;

        debug!(type_tag = %tag, primary_key = %object.primary_key, "resolved comment target");
        Ok(TargetRef {
            key: TargetKey::new(tag.to_string(), object.primary_key),
            absolute_url: object.absolute_url,
        })
    }

    /// Loads `parent_id` and returns its target along with the parent itself.
    pub async fn resolve_via_parent(&self, parent_id: Uuid) -> Result<ResolvedTarget, CommentError> {
        let parent = self
            .comments
            .get(parent_id)
            .await?
            .ok_or(CommentError::ParentNotFound(parent_id))?;
        let target = self.resolve(&parent.target_type, &parent.target_pk).await?;
        Ok(ResolvedTarget {
            target,
            parent: Some(parent),
        })
    }

    pub async fn resolve_spec(&self, spec: &TargetSpec) -> Result<ResolvedTarget, CommentError> {
        match spec {
            TargetSpec::Explicit {
                type_tag,
                primary_key,
            } => Ok(ResolvedTarget {
                target: self.resolve(type_tag, primary_key).await?,
                parent: None,
            }),
            TargetSpec::Parent(parent_id) => self.resolve_via_parent(*parent_id).await,
        }
    }

    /// Target of an already stored comment.
    pub async fn resolve_comment(&self, comment: &Comment) -> Result<TargetRef, CommentError> {
        self.resolve(&comment.target_type, &comment.target_pk).await
    }
}
