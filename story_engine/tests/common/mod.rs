//! Shared fixtures for story engine integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use story_engine::StoryTree;

/// Path of the five-page sample tree: 0 -> (1 -> (2 END, 3 END), 4).
pub fn sample_data_file() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("sample.json")
}

pub fn sample_data() -> serde_json::Value {
    let content = std::fs::read_to_string(sample_data_file()).expect("sample fixture readable");
    serde_json::from_str(&content).expect("sample fixture is JSON")
}

pub fn sample_tree() -> StoryTree {
    StoryTree::load_json(sample_data_file()).expect("sample fixture loads")
}
