use super::{
    entity::Comment,
    errors::CommentError,
    repository::{CommentFilter, CommentOrder, CommentRepository, Placement},
};
use crate::domain::{
    shared::pagination::{PageInfo, PageRequest},
    sorting::sorter::SortSpec,
    target::entity::TargetKey,
};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RootPage {
    pub comments: Vec<Comment>,
    pub page: PageInfo,
}

/// Query side of the comment store: visible roots, their threads, counts.
#[derive(Clone)]
pub struct CommentTreeStore {
    repo: Arc<dyn CommentRepository>,
    hide_removed: bool,
}

impl CommentTreeStore {
    pub fn new(repo: Arc<dyn CommentRepository>, hide_removed: bool) -> Self {
        Self { repo, hide_removed }
    }

    /// Visibility predicates, limited to the flags the schema actually has.
    fn visible(&self, mut filter: CommentFilter) -> CommentFilter {
        let schema = self.repo.schema();
        filter.public_only = schema.has_public_flag;
        filter.hide_removed = self.hide_removed && schema.has_removed_flag;
        filter
    }

    fn roots_filter(&self, target: &TargetKey) -> Result<CommentFilter, CommentError> {
        if !target.is_well_formed() {
            return Err(CommentError::InvalidTarget(target.to_string()));
        }
        Ok(self.visible(CommentFilter {
            placement: Placement::RootsOnly,
            ..CommentFilter::for_target(target)
        }))
    }

    #[instrument(skip(self, sort), fields(sort = %sort.key))]
    pub async fn fetch_roots(
        &self,
        target: &TargetKey,
        sort: &SortSpec,
        page: &PageRequest,
    ) -> Result<RootPage, CommentError> {
        let filter = self.roots_filter(target)?;
        let total = self.repo.count(&filter).await?;
        let comments = self
            .repo
            .find(&filter, &CommentOrder::Sorted(sort.clone()), Some(page.window()))
            .await?;
        debug!(total, fetched = comments.len(), "fetched root comments");
        Ok(RootPage {
            comments,
            page: PageInfo::new(page, total),
        })
    }

    /// Replies in every thread started by `roots`, depth-first.
    pub async fn fetch_descendants(&self, roots: &[Comment]) -> Result<Vec<Comment>, CommentError> {
        let Some(first) = roots.first() else {
            return Ok(Vec::new());
        };
        let filter = self.visible(CommentFilter {
            placement: Placement::RepliesOnly,
            tree_ids: Some(roots.iter().map(|r| r.tree_id).collect()),
            ..CommentFilter::for_target(&first.target_key())
        });
        self.repo.find(&filter, &CommentOrder::DepthFirst, None).await
    }

    /// Every visible comment on `target`, replies included.
    pub async fn count(&self, target: &TargetKey) -> Result<i64, CommentError> {
        if !target.is_well_formed() {
            return Err(CommentError::InvalidTarget(target.to_string()));
        }
        self.repo
            .count(&self.visible(CommentFilter::for_target(target)))
            .await
    }

    /// Zero-based index of `root_id` among the visible roots of `target`.
    pub async fn root_position(
        &self,
        target: &TargetKey,
        sort: &SortSpec,
        root_id: Uuid,
    ) -> Result<Option<usize>, CommentError> {
        let filter = self.roots_filter(target)?;
        let roots = self
            .repo
            .find(&filter, &CommentOrder::Sorted(sort.clone()), None)
            .await?;
        Ok(roots.iter().position(|c| c.id == root_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{comment::tree::TreeCachePage, sorting::sorter::SortRegistry},
        infrastructure::repositories::memory_comment_repository::MemoryCommentRepository,
    };
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    async fn seed(repo: &MemoryCommentRepository, comment: Comment) -> Comment {
        repo.insert(&comment).await.unwrap()
    }

    #[tokio::test]
    async fn descendants_stay_within_the_page_trees() {
        let repo = Arc::new(MemoryCommentRepository::new());
        let target = TargetKey::new("blog.article", "42");
        let sorts = SortRegistry::new();

        let c1 = seed(&repo, Comment::draft(&target, at(100))).await;
        let c2 = seed(&repo, Comment::draft(&target, at(200))).await;
        let mut c3 = Comment::draft(&target, at(150));
        c3.attach_to(&c1);
        let c3 = seed(&repo, c3).await;
        let mut c4 = Comment::draft(&target, at(250));
        c4.attach_to(&c2);
        seed(&repo, c4).await;

        let store = CommentTreeStore::new(repo, true);
        let roots = store
            .fetch_roots(&target, sorts.resolve(Some("oldest")), &PageRequest::new(Some(1), 1))
            .await
            .unwrap();
        assert_eq!(roots.comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c1.id]);
        assert_eq!(roots.page.total, 2);

        let descendants = store.fetch_descendants(&roots.comments).await.unwrap();
        assert!(descendants.iter().all(|c| c.tree_id == c1.id));

        let page = TreeCachePage::build(roots.comments, descendants);
        assert_eq!(page.children(c1.id).map(|c| c.id).collect::<Vec<_>>(), vec![c3.id]);
    }

    #[tokio::test]
    async fn hidden_comments_are_filtered() {
        let repo = Arc::new(MemoryCommentRepository::new());
        let target = TargetKey::new("blog.article", "42");

        let root = seed(&repo, Comment::draft(&target, at(100))).await;
        let mut removed = Comment::draft(&target, at(110));
        removed.attach_to(&root);
        removed.is_removed = true;
        let removed = seed(&repo, removed).await;
        let mut under_removed = Comment::draft(&target, at(120));
        under_removed.attach_to(&removed);
        let under_removed = seed(&repo, under_removed).await;
        let mut private = Comment::draft(&target, at(130));
        private.is_public = false;
        seed(&repo, private).await;

        let store = CommentTreeStore::new(repo, true);
        assert_eq!(store.count(&target).await.unwrap(), 2);

        let roots = store
            .fetch_roots(&target, SortRegistry::new().resolve(None), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(roots.comments.len(), 1);
        let page = TreeCachePage::build(
            roots.comments.clone(),
            store.fetch_descendants(&roots.comments).await.unwrap(),
        );
        assert!(!page.contains(removed.id));
        assert!(!page.contains(under_removed.id));
    }

    #[tokio::test]
    async fn schemas_without_removed_flag_skip_that_predicate() {
        let repo = Arc::new(MemoryCommentRepository::with_schema(
            crate::domain::comment::repository::CommentSchema {
                has_public_flag: true,
                has_removed_flag: false,
            },
        ));
        let target = TargetKey::new("blog.article", "42");
        let mut removed = Comment::draft(&target, at(100));
        removed.is_removed = true;
        seed(&repo, removed).await;

        let store = CommentTreeStore::new(repo, true);
        assert_eq!(store.count(&target).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_targets_are_rejected() {
        let store = CommentTreeStore::new(Arc::new(MemoryCommentRepository::new()), true);
        let err = store
            .fetch_roots(
                &TargetKey::new("article", ""),
                SortRegistry::new().resolve(None),
                &PageRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::InvalidTarget(_)));
        assert!(store.fetch_descendants(&[]).await.unwrap().is_empty());
    }
}
