//! # Story Model
//!
//! The value types of a branching story: pages, their karma deltas and media,
//! plus the settings that drive page generation. This crate holds no tree or
//! traversal logic; see `story_engine` for that.

pub mod karma;
pub mod page;
pub mod settings;

pub use karma::*;
pub use page::*;
pub use settings::*;
