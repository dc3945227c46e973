//! Path - one reader's walk through a story tree.

use std::collections::BTreeMap;

use story_model::{KarmaPoints, Page, PageId, PageType};
use tracing::debug;

use crate::error::{Result, StoryError};
use crate::story_tree::{StoryTree, TreeNode};

/// A traversal session over a [`StoryTree`].
///
/// The path stores only page ids; every method that needs content takes the
/// tree by reference. Any number of paths can walk the same tree, and the
/// tree can grow between moves without invalidating them.
///
/// `pages_visited` and `actions_taken` always have the same length, and the
/// last visited page is the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pages_visited: Vec<PageId>,
    actions_taken: Vec<String>,
    finished: bool,
}

impl Path {
    /// Open a path at the root of the tree.
    pub fn new(tree: &StoryTree) -> Result<Self> {
        let root = tree.get_root().ok_or_else(|| {
            StoryError::InvalidOperation("the story tree has no root".to_string())
        })?;
        let root_page = tree
            .get_page(root.page_id())
            .ok_or_else(|| StoryError::page_not_found(root.page_id()))?;

        Ok(Self {
            pages_visited: vec![root_page.id().clone()],
            actions_taken: vec![root_page.action.clone().unwrap_or_default()],
            finished: root_page.is_end(),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Id of the page the path started from.
    pub fn root_page_id(&self) -> &PageId {
        self.endpoints().0
    }

    pub fn current_page_id(&self) -> &PageId {
        self.endpoints().1
    }

    /// First and last visited ids. `go_back` never pops the root, so the
    /// history is never empty.
    fn endpoints(&self) -> (&PageId, &PageId) {
        match self.pages_visited.as_slice() {
            [root, .., current] => (root, current),
            [root] => (root, root),
            [] => unreachable!("a path always holds its root page"),
        }
    }

    pub fn pages_visited(&self) -> &[PageId] {
        &self.pages_visited
    }

    /// Number of pages visited, the root included.
    pub fn page_count(&self) -> usize {
        self.pages_visited.len()
    }

    /// Resolve the current node by walking the visited ids down from the root.
    pub fn current_node<'t>(&self, tree: &'t StoryTree) -> Result<&'t TreeNode> {
        let root_id = self.root_page_id();
        let mut node = tree
            .get_root()
            .filter(|root| root.page_id() == root_id)
            .ok_or_else(|| StoryError::node_not_found(root_id))?;

        for page_id in &self.pages_visited[1..] {
            node = node
                .child(page_id)
                .ok_or_else(|| StoryError::node_not_found(page_id))?;
        }
        Ok(node)
    }

    pub fn get_current_page<'t>(&self, tree: &'t StoryTree) -> Result<&'t Page> {
        let page_id = self.current_page_id();
        tree.get_page(page_id)
            .ok_or_else(|| StoryError::page_not_found(page_id))
    }

    /// Actions available from the current page, keyed by label.
    ///
    /// Start pages are labelled `"Start <page id>"` so alternate openings stay
    /// distinct; every other child is labelled by its own action. Colliding
    /// labels are not disambiguated: the later child wins.
    pub fn view_action_options<'t>(
        &self,
        tree: &'t StoryTree,
    ) -> Result<BTreeMap<String, &'t TreeNode>> {
        let node = self.current_node(tree)?;
        let mut options = BTreeMap::new();

        for child in node.children() {
            let page = tree
                .get_page(child.page_id())
                .ok_or_else(|| StoryError::page_not_found(child.page_id()))?;
            options.insert(action_label(page), child);
        }
        Ok(options)
    }

    /// Follow an action. Returns whether the path is now finished.
    pub fn take_action(&mut self, tree: &StoryTree, action: &str) -> Result<bool> {
        let options = self.view_action_options(tree)?;
        let next = options
            .get(action)
            .ok_or_else(|| StoryError::ActionNotAvailable(action.to_string()))?;
        let next_id = next.page_id().clone();
        let next_page = tree
            .get_page(&next_id)
            .ok_or_else(|| StoryError::page_not_found(&next_id))?;

        self.finished = next_page.is_end();
        debug!(action, page = %next_id, finished = self.finished, "Took action");
        self.pages_visited.push(next_id);
        self.actions_taken.push(action.to_string());
        Ok(self.finished)
    }

    /// Undo the last action.
    pub fn go_back(&mut self) -> Result<()> {
        if self.pages_visited.len() <= 1 {
            return Err(StoryError::InvalidOperation(
                "cannot go back past the first page".to_string(),
            ));
        }
        self.pages_visited.pop();
        self.actions_taken.pop();
        self.finished = false;
        debug!(page = %self.current_page_id(), "Went back");
        Ok(())
    }

    /// Re-derive the finished flag after the current page was rewritten.
    pub fn refresh(&mut self, tree: &StoryTree) -> Result<bool> {
        self.finished = self.get_current_page(tree)?.is_end();
        Ok(self.finished)
    }

    /// Total karma of every visited page, root to current.
    pub fn compute_karma(&self, tree: &StoryTree) -> Result<KarmaPoints> {
        self.pages_visited.iter().try_fold(KarmaPoints::zero(), |total, page_id| -> Result<KarmaPoints> {
            let page = tree
                .get_page(page_id)
                .ok_or_else(|| StoryError::page_not_found(page_id))?;
            Ok(total.add(page.karma))
        })
    }

    /// Visited pages, in order.
    pub fn get_pages<'t>(&self, tree: &'t StoryTree) -> Result<Vec<&'t Page>> {
        self.pages_visited
            .iter()
            .map(|page_id| {
                tree.get_page(page_id)
                    .ok_or_else(|| StoryError::page_not_found(page_id))
            })
            .collect()
    }

    /// Actions taken, in order; the first is the root page's own action.
    pub fn get_actions_taken(&self) -> &[String] {
        &self.actions_taken
    }
}

/// Label under which a page is offered as an option.
pub fn action_label(page: &Page) -> String {
    match page.page_type {
        PageType::Start => format!("Start {}", page.id()),
        _ => page.action.clone().unwrap_or_default(),
    }
}
