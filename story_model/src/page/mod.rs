//! Page definitions: the content of a single beat of the story.

mod content;

pub use content::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::karma::KarmaPoints;

/// Unique identifier for pages.
///
/// Fresh ids are random v4 uuids in their 32-character hex form, but any
/// string is accepted so hand-written story documents can use short ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Create a new random page ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role a page plays in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// Holds the story premise; never part of a traversal.
    Context,
    /// An entry action, offered as an alternate opening.
    Start,
    /// An interior page.
    #[default]
    Action,
    /// Terminates a path; offers no further actions.
    End,
}

impl PageType {
    /// Lowercase name as used in story documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Context => "context",
            PageType::Start => "start",
            PageType::Action => "action",
            PageType::End => "end",
        }
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page in the story.
///
/// A page without a description is unwritten: a placeholder waiting for
/// the generator to fill it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Fixed once the page is built; read it with [`Page::id`].
    id: PageId,
    pub page_type: PageType,

    /// Label of the choice that leads to this page.
    pub action: Option<String>,

    /// Karma delta contributed by visiting this page.
    pub karma: KarmaPoints,

    pub description: Option<Description>,
    pub image: Option<Image>,
}

impl Page {
    /// Create a new, unwritten page of the given type.
    pub fn new(page_type: PageType) -> Self {
        Self {
            id: PageId::new(),
            page_type,
            action: None,
            karma: KarmaPoints::zero(),
            description: None,
            image: None,
        }
    }

    /// Create a context page holding the story premise.
    pub fn context(premise: impl Into<String>) -> Self {
        Self::new(PageType::Context).with_description(Description::new(premise))
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<PageId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the action label.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the karma delta.
    pub fn with_karma(mut self, karma: KarmaPoints) -> Self {
        self.karma = karma;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: Description) -> Self {
        self.description = Some(description);
        self
    }

    /// Set the image.
    pub fn with_image(mut self, image: Image) -> Self {
        self.image = Some(image);
        self
    }

    /// Whether the page has been written.
    pub fn is_written(&self) -> bool {
        self.description.is_some()
    }

    /// Whether this page ends a path.
    pub fn is_end(&self) -> bool {
        self.page_type == PageType::End
    }

    /// The page text, if written.
    pub fn text(&self) -> Option<&str> {
        self.description.as_ref().map(|d| d.page.as_str())
    }
}
