//! Error taxonomy for story operations.
//!
//! Every variant is session-scoped and recoverable: the caller decides whether
//! to surface a message, retry, or drop the session.

use story_model::{PageId, SettingsError};
use thiserror::Error;

/// Errors from story tree, path and generation operations.
#[derive(Debug, Error)]
pub enum StoryError {
    /// Malformed story document or field that cannot be coerced.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A lookup failed where presence was required.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The chosen label is not among the current options.
    #[error("Action '{0}' not available")]
    ActionNotAvailable(String),

    #[error("Page {0} already exists")]
    DuplicateKey(PageId),

    /// Structurally illegal operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The page generator kept failing.
    #[error("Page generation failed after {attempts} attempts: {reason}")]
    GenerationFailed { attempts: u32, reason: String },

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoryError {
    pub(crate) fn page_not_found(id: &PageId) -> Self {
        StoryError::NotFound {
            kind: "Page",
            id: id.to_string(),
        }
    }

    pub(crate) fn node_not_found(id: &PageId) -> Self {
        StoryError::NotFound {
            kind: "Tree node",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoryError>;
