//! Story Tree - the branching narrative: structure plus page content.

use std::path::{Path as FsPath, PathBuf};

use story_model::{Page, PageId, PageType};
use tracing::{debug, warn};

use super::{PageRepository, TreeNode};
use crate::error::{Result, StoryError};

/// The full branching story.
///
/// Structure lives in the [`TreeNode`] hierarchy, content in the
/// [`PageRepository`]. Every node references a page present in the
/// repository. The tree is mutated only through [`StoryTree::add_page`] and
/// [`StoryTree::remove_page`]; traversal sessions never touch it.
#[derive(Debug, Clone, Default)]
pub struct StoryTree {
    pub(crate) pages: PageRepository,
    pub(crate) root: Option<TreeNode>,

    /// File the tree was loaded from, if any.
    pub(crate) source: Option<PathBuf>,
}

impl StoryTree {
    /// Create an empty tree with no root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree whose root is a context page holding the premise.
    pub fn with_context(premise: impl Into<String>) -> Self {
        let page = Page::context(premise);
        let root = TreeNode::new(page.id().clone());
        Self {
            pages: std::iter::once(page).collect(),
            root: Some(root),
            source: None,
        }
    }

    /// Add a page and a node for it.
    ///
    /// Without a parent the node becomes the root, which fails if a root
    /// already exists. Otherwise the node is appended to the parent's
    /// children. Nothing is modified when an error is returned.
    pub fn add_page(&mut self, page: Page, parent: Option<&PageId>) -> Result<&TreeNode> {
        if self.pages.contains(page.id()) {
            return Err(StoryError::DuplicateKey(page.id().clone()));
        }
        let node = TreeNode::new(page.id().clone());

        match parent {
            None => {
                if self.root.is_some() {
                    return Err(StoryError::InvalidOperation(
                        "the story tree already has a root".to_string(),
                    ));
                }
                debug!(page = %page.id(), page_type = %page.page_type, "Adding root page");
                self.pages.add(page, true)?;
                Ok(&*self.root.insert(node))
            }
            Some(parent_id) => {
                let parent_node = self
                    .root
                    .as_mut()
                    .and_then(|root| root.find_mut(parent_id))
                    .ok_or_else(|| StoryError::node_not_found(parent_id))?;
                debug!(page = %page.id(), parent = %parent_id, page_type = %page.page_type, "Adding page");
                self.pages.add(page, true)?;
                Ok(&*parent_node.add_child(node))
            }
        }
    }

    pub fn get_root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    pub fn get_page(&self, id: &PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    /// Mutable page access, for filling in unwritten pages.
    pub fn get_page_mut(&mut self, id: &PageId) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    /// The page at the root.
    pub fn root_page(&self) -> Option<&Page> {
        self.root.as_ref().and_then(|root| self.pages.get(root.page_id()))
    }

    /// The root page when it holds the story premise.
    pub fn context_page(&self) -> Option<&Page> {
        self.root_page()
            .filter(|page| page.page_type == PageType::Context)
    }

    /// Depth-first search from the root.
    pub fn search_node(&self, id: &PageId) -> Option<&TreeNode> {
        self.root.as_ref().and_then(|root| root.find(id))
    }

    /// Depth-first search starting at an arbitrary node.
    pub fn search_node_from<'a>(&self, id: &PageId, from: &'a TreeNode) -> Option<&'a TreeNode> {
        from.find(id)
    }

    /// Remove a page together with its whole subtree.
    ///
    /// Removing the root clears the tree. Returns the removed page ids.
    /// A node whose page is missing from the repository is still detached,
    /// but the call then fails with [`StoryError::NotFound`].
    pub fn remove_page(&mut self, id: &PageId) -> Result<Vec<PageId>> {
        let node = self
            .search_node(id)
            .ok_or_else(|| StoryError::node_not_found(id))?;

        let parent_id = node.parent().cloned();

        let removed = match parent_id {
            None => {
                let removed = node.subtree_ids();
                self.root = None;
                self.pages.clear();
                removed
            }
            Some(parent_id) => {
                let parent = self
                    .root
                    .as_mut()
                    .and_then(|root| root.find_mut(&parent_id))
                    .ok_or_else(|| StoryError::node_not_found(&parent_id))?;
                let removed = parent.remove_child(id);
                let mut missing = None;
                for removed_id in &removed {
                    if self.pages.remove(removed_id).is_err() && missing.is_none() {
                        missing = Some(removed_id);
                    }
                }
                if let Some(missing) = missing {
                    warn!(page = %missing, "Removed node had no page in the repository");
                    return Err(StoryError::page_not_found(missing));
                }
                removed
            }
        };

        debug!(page = %id, removed = removed.len(), "Removed subtree");
        Ok(removed)
    }

    /// Number of pages in the repository, orphans included.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages, in no particular order.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// File the tree was loaded from or last saved to.
    pub fn source(&self) -> Option<&FsPath> {
        self.source.as_deref()
    }
}
