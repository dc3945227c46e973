//! # Story Engine
//!
//! The branching "choose your own adventure" core. A [`StoryTree`] holds every
//! page ever written; a [`Path`] is one reader's walk through it; the
//! [`Teller`] lazily fills in unwritten branches through a [`PageGenerator`].
//!
//! ## Core Components
//!
//! - **story_tree**: Pages, tree structure, cascade removal and persistence
//! - **path**: Traversal cursor with undo, action resolution and karma totals
//! - **teller**: Bounded-retry page generation and option sampling
//!
//! Nothing here renders, prompts a model directly, or blocks on I/O other
//! than the explicit JSON load and save helpers.

pub mod error;
pub mod path;
pub mod story_tree;
pub mod teller;

pub use error::*;
pub use path::*;
pub use story_tree::*;
pub use teller::*;

pub use story_model;
