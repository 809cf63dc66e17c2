use super::entity::Comment;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Roots of one page plus the adjacency of their fetched subtrees.
///
/// Comments live in a flat index; children are id lists rebuilt per request.
#[derive(Debug, Clone, Default)]
pub struct TreeCachePage {
    roots: Vec<Uuid>,
    nodes: HashMap<Uuid, Comment>,
    children_by_parent: HashMap<Uuid, Vec<Uuid>>,
}

impl TreeCachePage {
    /// Assembles the tree in one pass over `descendants`.
    ///
    /// Descendants are expected depth-first (parents first). Input that breaks
    /// this order is stably re-sorted by level before linking. A descendant
    /// whose parent is not indexed is dropped, together with its own subtree.
    pub fn build(roots: Vec<Comment>, mut descendants: Vec<Comment>) -> Self {
        let mut page = Self::default();
        for root in roots {
            if page.nodes.contains_key(&root.id) {
                continue;
            }
            page.roots.push(root.id);
            page.children_by_parent.insert(root.id, Vec::new());
            page.nodes.insert(root.id, root);
        }

        if !is_depth_first(&descendants) {
            tracing::debug!("descendants out of order, re-sorting by level");
            descendants.sort_by_key(|c| c.level);
        }

        let mut dropped = 0usize;
        for comment in descendants {
            if page.nodes.contains_key(&comment.id) {
                continue;
            }
            let Some(parent_id) = comment.parent_id else {
                dropped += 1;
                continue;
            };
            let Some(siblings) = page.children_by_parent.get_mut(&parent_id) else {
                dropped += 1;
                continue;
            };
            siblings.push(comment.id);
            page.children_by_parent.insert(comment.id, Vec::new());
            page.nodes.insert(comment.id, comment);
        }
        if dropped > 0 {
            tracing::debug!(dropped, "orphaned comments left out of the tree");
        }
        page
    }

    pub fn roots(&self) -> impl Iterator<Item = &Comment> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn children(&self, id: Uuid) -> impl Iterator<Item = &Comment> {
        self.children_by_parent
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.nodes.get(child))
    }

    pub fn get(&self, id: Uuid) -> Option<&Comment> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nested view for serialization.
    pub fn to_nodes(&self) -> Vec<CommentNode> {
        self.roots().map(|root| self.node(root)).collect()
    }

    fn node(&self, comment: &Comment) -> CommentNode {
        CommentNode {
            comment: comment.clone(),
            children: self.children(comment.id).map(|c| self.node(c)).collect(),
        }
    }
}

/// True when every parent precedes its children.
fn is_depth_first(descendants: &[Comment]) -> bool {
    let batch: HashSet<Uuid> = descendants.iter().map(|c| c.id).collect();
    let mut seen = HashSet::with_capacity(descendants.len());
    for comment in descendants {
        if let Some(parent) = comment.parent_id {
            if batch.contains(&parent) && !seen.contains(&parent) {
                return false;
            }
        }
        seen.insert(comment.id);
    }
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}
