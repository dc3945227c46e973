//! Tree nodes - the structural side of the story tree.

use serde::{Deserialize, Serialize};
use story_model::PageId;

/// A position in the story tree referencing a page by id.
///
/// Children are owned, in insertion order. The parent link is a plain id
/// back-reference and never owns anything; it is only maintained through
/// [`TreeNode::add_child`] and [`TreeNode::remove_child`].
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    page_id: PageId,
    parent: Option<PageId>,
    children: Vec<TreeNode>,
}

/// Persisted shape of a node: `{"page_uuid": ..., "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub page_uuid: PageId,
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

impl TreeNode {
    /// Create a detached node with no parent and no children.
    pub fn new(page_id: PageId) -> Self {
        Self {
            page_id,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn page_id(&self) -> &PageId {
        &self.page_id
    }

    /// Id of the parent node, `None` for a root or detached node.
    pub fn parent(&self) -> Option<&PageId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Direct child with the given page id.
    pub fn child(&self, page_id: &PageId) -> Option<&TreeNode> {
        self.children.iter().find(|c| &c.page_id == page_id)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Attach a node as the last child of this one.
    pub fn add_child(&mut self, mut node: TreeNode) -> &mut TreeNode {
        node.parent = Some(self.page_id.clone());
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Detach the direct child with the given id.
    ///
    /// Returns the page ids of the removed subtree, descendants before their
    /// ancestors. A missing child removes nothing and yields an empty list.
    pub fn remove_child(&mut self, page_id: &PageId) -> Vec<PageId> {
        let Some(index) = self.children.iter().position(|c| &c.page_id == page_id) else {
            return Vec::new();
        };
        let mut removed = self.children.remove(index);
        removed.parent = None;
        removed.subtree_ids()
    }

    /// Page ids of this node and all its descendants, in post-order.
    pub fn subtree_ids(&self) -> Vec<PageId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<PageId>) {
        for child in &self.children {
            child.collect_ids(ids);
        }
        ids.push(self.page_id.clone());
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_len).sum::<usize>()
    }

    /// Depth-first search for a node in this subtree.
    pub fn find(&self, page_id: &PageId) -> Option<&TreeNode> {
        if &self.page_id == page_id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(page_id))
    }

    /// Mutable variant of [`TreeNode::find`].
    pub fn find_mut(&mut self, page_id: &PageId) -> Option<&mut TreeNode> {
        if &self.page_id == page_id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(page_id))
    }

    /// Structural snapshot for persistence.
    pub fn to_document(&self) -> NodeDocument {
        NodeDocument {
            page_uuid: self.page_id.clone(),
            children: self.children.iter().map(TreeNode::to_document).collect(),
        }
    }

    /// Rebuild a subtree from its persisted shape, linking it under `parent`.
    pub fn from_document(doc: &NodeDocument, parent: Option<&PageId>) -> Self {
        let mut node = TreeNode::new(doc.page_uuid.clone());
        node.parent = parent.cloned();
        for child in &doc.children {
            node.add_child(TreeNode::from_document(child, None));
        }
        node
    }
}

impl std::fmt::Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeNode(page={}", self.page_id)?;
        if !self.children.is_empty() {
            f.write_str(", children=[")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", child)?;
            }
            f.write_str("]")?;
        }
        f.write_str(")")
    }
}
