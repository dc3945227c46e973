//! The page generator collaborator and its request/response shapes.

use serde::{Deserialize, Serialize};
use story_model::KarmaPoints;

/// Everything the generator is told about the page to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The story premise.
    pub context: String,

    /// 1-based position of the page in the story, context excluded.
    pub page_number: usize,

    /// `"<action>: <text>"` summaries of the pages read so far.
    pub pages: Vec<String>,

    /// Karma accumulated along the path.
    pub karma: KarmaPoints,

    /// The action that leads to the page being written.
    pub action: String,
}

/// An image produced alongside a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    /// Visual description the image was made from.
    pub description: Option<String>,
}

/// What the generator returns for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPage {
    pub description: String,
    pub image: Option<GeneratedImage>,

    /// Labels of the choices that follow. An `"End"` label, or no labels at
    /// all, ends the story at this page.
    pub next_actions: Vec<String>,

    /// Karma delta of the page.
    pub karma: KarmaPoints,
}

impl GeneratedPage {
    /// Whether the response ends the story.
    pub fn is_ending(&self) -> bool {
        self.next_actions.is_empty()
            || self.next_actions.iter().any(|action| is_end_marker(action))
    }
}

/// Whether a next-action label is the `"End"` marker rather than a choice.
pub fn is_end_marker(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case("end")
}

/// External generative backend that writes pages on demand.
///
/// Calls are synchronous and may fail; the [`crate::Teller`] retries them a
/// bounded number of times.
pub trait PageGenerator {
    type Error: std::error::Error;

    fn generate(&mut self, request: &GenerationRequest) -> Result<GeneratedPage, Self::Error>;
}
