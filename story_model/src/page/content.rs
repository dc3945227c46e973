//! Written content attached to pages.

use serde::{Deserialize, Serialize};

/// Narrative text of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// The text of the page.
    pub page: String,

    /// A visual description of the page, used to caption or prompt an image.
    #[serde(default)]
    pub image: Option<String>,
}

impl Description {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Image reference for a page. Loaded lazily, so every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Image {
    /// Local path, when the image lives on disk.
    #[serde(default)]
    pub path: Option<String>,

    /// Remote url, when the image is not local.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Image {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the image points anywhere yet.
    pub fn is_resolved(&self) -> bool {
        self.path.is_some() || self.url.is_some()
    }
}
