use super::dto::{CommentCount, CommentListing};
use crate::domain::{
    comment::{errors::CommentError, tree::TreeCachePage, tree_store::CommentTreeStore},
    shared::pagination::PageRequest,
    sorting::sorter::SortRegistry,
    target::locator::ContentLocator,
};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct ListCommentsUseCase {
    locator: Arc<ContentLocator>,
    store: CommentTreeStore,
    sorts: Arc<SortRegistry>,
    per_page: i64,
}

impl ListCommentsUseCase {
    pub fn new(
        locator: Arc<ContentLocator>,
        store: CommentTreeStore,
        sorts: Arc<SortRegistry>,
        per_page: i64,
    ) -> Self {
        Self {
            locator,
            store,
            sorts,
            per_page,
        }
    }

    /// Sorted, paginated roots of the target with their replies attached.
    ///
    /// Unknown sort keys use the default ordering; pages past the end are empty.
    #[instrument(skip(self))]
    pub async fn render_comment_list(
        &self,
        type_tag: &str,
        primary_key: &str,
        sort: Option<&str>,
        page: Option<i64>,
    ) -> Result<CommentListing, CommentError> {
        let target = self.locator.resolve(type_tag, primary_key).await?;
        let spec = self.sorts.resolve(sort);
        let request = PageRequest::new(page, self.per_page);

        let roots = self.store.fetch_roots(&target.key, spec, &request).await?;
        let descendants = self.store.fetch_descendants(&roots.comments).await?;
        let tree = TreeCachePage::build(roots.comments, descendants);
        debug!(nodes = tree.len(), sort = %spec.key, "built comment tree");

        Ok(CommentListing {
            target,
            sort: spec.key.clone(),
            sort_options: self.sorts.options(),
            page: roots.page,
            tree,
        })
    }

    pub async fn count_comments(
        &self,
        type_tag: &str,
        primary_key: &str,
    ) -> Result<CommentCount, CommentError> {
        let target = self.locator.resolve(type_tag, primary_key).await?;
        let count = self.store.count(&target.key).await?;
        Ok(CommentCount { target, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            comment::{entity::Comment, repository::CommentRepository},
            target::{
                entity::{KeyFormat, TargetKey, TypeTag},
                registry::TargetRegistry,
            },
        },
        infrastructure::{
            repositories::memory_comment_repository::MemoryCommentRepository,
            targets::static_target_kind::StaticTargetKind,
        },
    };
    use chrono::Utc;

    async fn listing_with_one_comment() -> ListCommentsUseCase {
        let repo = Arc::new(MemoryCommentRepository::new());
        let mut comment = Comment::draft(&TargetKey::new("blog.article", "42"), Utc::now());
        comment.body = "First!".into();
        repo.insert(&comment).await.unwrap();

        let mut registry = TargetRegistry::new();
        registry.register(
            TypeTag::parse("blog.article").unwrap(),
            Arc::new(StaticTargetKind::new(KeyFormat::Integer, "/articles/{pk}/", ["42"])),
        );
        let locator = Arc::new(ContentLocator::new(Arc::new(registry), repo.clone()));
        ListCommentsUseCase::new(
            locator,
            CommentTreeStore::new(repo, false),
            Arc::new(SortRegistry::new()),
            10,
        )
    }

    #[tokio::test]
    async fn first_page_lists_the_thread() {
        let listing = listing_with_one_comment().await;
        let page = listing
            .render_comment_list("blog.article", "42", None, None)
            .await
            .unwrap();
        assert_eq!(page.tree.len(), 1);
        assert_eq!(page.page.total, 1);
    }

    #[tokio::test]
    async fn absurd_page_numbers_render_an_empty_page() {
        let listing = listing_with_one_comment().await;
        let page = listing
            .render_comment_list("blog.article", "42", None, Some(i64::MAX))
            .await
            .unwrap();
        assert!(page.tree.is_empty());
        assert_eq!(page.page.page, i64::MAX);
        assert_eq!(page.page.total, 1);
        assert!(!page.page.has_next);
    }
}
