use crate::domain::{
    comment::tree::{CommentNode, TreeCachePage},
    shared::pagination::PageInfo,
    sorting::sorter::SortOption,
    target::entity::TargetRef,
};
use serde::Serialize;
use ts_rs::TS;

/// One page of threads on a target.
#[derive(Debug, Clone)]
pub struct CommentListing {
    pub target: TargetRef,
    pub sort: String,
    pub sort_options: Vec<SortOption>,
    pub page: PageInfo,
    pub tree: TreeCachePage,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentListResponse {
    pub target: TargetRef,
    pub sort: String,
    pub sort_options: Vec<SortOption>,
    pub page: PageInfo,
    pub comments: Vec<CommentNode>,
    pub templates: Vec<String>,
}

impl CommentListing {
    pub fn into_response(self, templates: Vec<String>) -> CommentListResponse {
        CommentListResponse {
            comments: self.tree.to_nodes(),
            target: self.target,
            sort: self.sort,
            sort_options: self.sort_options,
            page: self.page,
            templates,
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CommentCount {
    pub target: TargetRef,
    pub count: i64,
}
