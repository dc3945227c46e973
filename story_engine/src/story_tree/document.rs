//! Persisted story document: bulk load and save of a whole tree.
//!
//! ```json
//! {
//!   "root": {"page_uuid": "0", "children": [...]},
//!   "pages": {
//!     "0": {"page_type": "start", "action": "start", "karma": {...},
//!           "description": {"page": "...", "image": null}, "image": null}
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path as FsPath;

use story_model::{Description, Image, KarmaPoints, Page, PageId, PageType};
use tracing::debug;

use super::{NodeDocument, PageRepository, StoryTree, TreeNode};
use crate::error::{Result, StoryError};

/// The whole tree in its persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    pub root: Option<NodeDocument>,
    #[serde(default)]
    pub pages: BTreeMap<PageId, PageDocument>,
}

/// One page in its persisted shape; the id is the key in `pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    pub page_type: PageType,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub karma: KarmaPoints,
    #[serde(default)]
    pub description: Option<Description>,
    #[serde(default)]
    pub image: Option<Image>,
}

impl PageDocument {
    fn from_page(page: &Page) -> Self {
        Self {
            page_type: page.page_type,
            action: page.action.clone(),
            karma: page.karma,
            description: page.description.clone(),
            image: page.image.clone(),
        }
    }

    fn into_page(self, id: PageId) -> Page {
        let mut page = Page::new(self.page_type).with_id(id);
        page.action = self.action;
        page.karma = self.karma;
        page.description = self.description;
        page.image = self.image;
        page
    }
}

/// Check that every node references a known page exactly once.
fn validate_structure(
    node: &NodeDocument,
    pages: &BTreeMap<PageId, PageDocument>,
    seen: &mut HashSet<PageId>,
) -> Result<()> {
    if !pages.contains_key(&node.page_uuid) {
        return Err(StoryError::Validation(format!(
            "tree node {} has no page entry",
            node.page_uuid
        )));
    }
    if !seen.insert(node.page_uuid.clone()) {
        return Err(StoryError::Validation(format!(
            "page {} appears more than once in the tree",
            node.page_uuid
        )));
    }
    for child in &node.children {
        validate_structure(child, pages, seen)?;
    }
    Ok(())
}

fn classify_json_error(err: serde_json::Error) -> StoryError {
    if err.is_data() {
        StoryError::Validation(err.to_string())
    } else {
        StoryError::Json(err)
    }
}

impl StoryTree {
    /// Build a tree from its persisted shape.
    pub fn from_document(doc: TreeDocument) -> Result<Self> {
        let root = match &doc.root {
            Some(root_doc) => {
                validate_structure(root_doc, &doc.pages, &mut HashSet::new())?;
                Some(TreeNode::from_document(root_doc, None))
            }
            None => None,
        };

        let pages: PageRepository = doc
            .pages
            .into_iter()
            .map(|(id, page)| page.into_page(id))
            .collect();

        debug!(pages = pages.len(), "Loaded story tree document");
        Ok(Self {
            pages,
            root,
            source: None,
        })
    }

    /// Snapshot the tree in its persisted shape.
    pub fn to_document(&self) -> TreeDocument {
        TreeDocument {
            root: self.root.as_ref().map(TreeNode::to_document),
            pages: self
                .pages
                .iter()
                .map(|page| (page.id().clone(), PageDocument::from_page(page)))
                .collect(),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: TreeDocument = serde_json::from_str(content).map_err(classify_json_error)?;
        Self::from_document(doc)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Load a tree from a JSON file, remembering the file as its source.
    pub fn load_json(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut tree = Self::from_json_str(&content)?;
        tree.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "Loaded story tree");
        Ok(tree)
    }

    /// Write the tree to a JSON file.
    pub fn save_json(&self, path: impl AsRef<FsPath>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?)?;
        debug!(path = %path.display(), pages = self.page_count(), "Saved story tree");
        Ok(())
    }
}
