//! Runtime settings for the command-line tool.
//!
//! Settings are read from an optional JSON file. Every field has a default,
//! so a partial file (or none at all) is valid.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides [`Settings::log_level`].
pub const LOG_ENV: &str = "RECIPE_CHECKS_LOG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub input: InputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            input: InputSettings::default(),
        }
    }
}

/// How tabular input files are read.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputSettings {
    pub has_header: bool,
    pub separator: char,
    /// Tokens read as missing in CSV input.
    pub null_values: Vec<String>,
    pub infer_schema_length: Option<usize>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            has_header: true,
            separator: ',',
            null_values: vec!["NA".to_owned(), String::new()],
            infer_schema_length: Some(10_000),
        }
    }
}

impl Settings {
    /// Load settings from `path` (or defaults), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(level) = std::env::var(LOG_ENV)
            && !level.trim().is_empty()
        {
            settings.log_level = level.trim().to_owned();
        }
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse config JSON")
    }
}
