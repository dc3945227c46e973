//! Story Tree module - the persistent branching narrative.
//!
//! The tree is split in two:
//! - **Nodes**: pure structure, each referencing a page by id
//! - **Repository**: page content keyed by id
//!
//! Traversal sessions ([`crate::Path`]) read the tree but never change it.

mod document;
mod node;
mod repository;
mod tree;

pub use document::*;
pub use node::*;
pub use repository::*;
pub use tree::*;
