use crate::domain::{
    comment::{
        entity::Comment, errors::CommentError, repository::CommentRepository,
        tree_store::CommentTreeStore,
    },
    sorting::sorter::SortRegistry,
    target::locator::ContentLocator,
};
use std::sync::Arc;
use uuid::Uuid;

/// Permalinks to comments inside the paginated listing of their target.
pub struct CommentLinksUseCase {
    locator: Arc<ContentLocator>,
    comments: Arc<dyn CommentRepository>,
    store: CommentTreeStore,
    sorts: Arc<SortRegistry>,
    per_page: i64,
}

impl CommentLinksUseCase {
    pub fn new(
        locator: Arc<ContentLocator>,
        comments: Arc<dyn CommentRepository>,
        store: CommentTreeStore,
        sorts: Arc<SortRegistry>,
        per_page: i64,
    ) -> Self {
        Self {
            locator,
            comments,
            store,
            sorts,
            per_page: per_page.max(1),
        }
    }

    async fn load(&self, id: Uuid) -> Result<Comment, CommentError> {
        self.comments
            .get(id)
            .await?
            .ok_or(CommentError::CommentNotFound(id))
    }

    /// 1-based listing page holding the comment's thread, under the default sort.
    pub async fn comment_page(&self, comment: &Comment) -> Result<Option<i64>, CommentError> {
        let position = self
            .store
            .root_position(&comment.target_key(), self.sorts.resolve(None), comment.tree_id)
            .await?;
        Ok(position.map(|index| index as i64 / self.per_page + 1))
    }

    pub async fn comment_url(&self, comment_id: Uuid) -> Result<String, CommentError> {
        let comment = self.load(comment_id).await?;
        let target = self.locator.resolve_comment(&comment).await?;
        let page = self.comment_page(&comment).await?;
        Ok(format!(
            "{}#comment-{}",
            with_page(&target.absolute_url, page.filter(|p| *p > 1)),
            comment.id
        ))
    }

    /// The parent's permalink, or the target's comment anchor for roots.
    pub async fn parent_url(&self, comment_id: Uuid) -> Result<String, CommentError> {
        let comment = self.load(comment_id).await?;
        match comment.parent_id {
            Some(parent) => self.comment_url(parent).await,
            None => {
                let target = self.locator.resolve_comment(&comment).await?;
                Ok(format!("{}#comments", strip_fragment(&target.absolute_url)))
            }
        }
    }
}

fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}

/// Replaces the `page` query parameter; `None` removes it.
fn with_page(url: &str, page: Option<i64>) -> String {
    let base = strip_fragment(url);
    let (path, query) = base.split_once('?').unwrap_or((base, ""));
    let mut params: Vec<String> = query
        .split('&')
        .filter(|p| !p.is_empty() && p.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    if let Some(page) = page {
        params.push(format!("page={}", page));
    }
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, params.join("&"))
    }
}
