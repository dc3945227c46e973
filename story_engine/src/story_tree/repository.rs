//! Page repository - owns the page content keyed by id.

use std::collections::HashMap;

use story_model::{Page, PageId};

use crate::error::{Result, StoryError};

/// Mapping of page id to page.
#[derive(Debug, Clone, Default)]
pub struct PageRepository {
    pages: HashMap<PageId, Page>,
}

impl PageRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page under its id.
    ///
    /// With `safe` set an existing id is rejected; otherwise it is overwritten.
    pub fn add(&mut self, page: Page, safe: bool) -> Result<()> {
        if safe && self.pages.contains_key(page.id()) {
            return Err(StoryError::DuplicateKey(page.id().clone()));
        }
        self.pages.insert(page.id().clone(), page);
        Ok(())
    }

    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.pages.get(id)
    }

    pub fn get_mut(&mut self, id: &PageId) -> Option<&mut Page> {
        self.pages.get_mut(id)
    }

    /// Remove a page, failing if it is absent.
    pub fn remove(&mut self, id: &PageId) -> Result<Page> {
        self.pages
            .remove(id)
            .ok_or_else(|| StoryError::page_not_found(id))
    }

    pub fn contains(&self, id: &PageId) -> bool {
        self.pages.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

impl FromIterator<Page> for PageRepository {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().map(|page| (page.id().clone(), page)).collect(),
        }
    }
}
