//! Settings for the story teller, read from a TOML document.
//!
//! ```toml
//! [teller]
//! max_tries = 3
//! new_start_probability = 0.5
//! new_page_probability = 0.5
//! max_action_chars = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySettings {
    pub teller: TellerSettings,
}

/// Knobs for lazy page generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TellerSettings {
    /// Attempts per generator call before giving up.
    pub max_tries: u32,

    /// Chance of generating a fresh opening instead of replaying an existing one.
    pub new_start_probability: f64,

    /// Chance of preferring an unwritten page when offering next actions.
    pub new_page_probability: f64,

    /// Longest accepted action label, in characters.
    pub max_action_chars: usize,
}

impl Default for TellerSettings {
    fn default() -> Self {
        Self {
            max_tries: 3,
            new_start_probability: 0.5,
            new_page_probability: 0.5,
            max_action_chars: 30,
        }
    }
}

impl TellerSettings {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_tries == 0 {
            return Err(SettingsError::Invalid(
                "teller.max_tries must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("new_start_probability", self.new_start_probability),
            ("new_page_probability", self.new_page_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::Invalid(format!(
                    "teller.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.max_action_chars == 0 {
            return Err(SettingsError::Invalid(
                "teller.max_action_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl StorySettings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.teller.validate()
    }
}
