//! Recipe specification data structures.
//!
//! Defines the JSON document a recipe is stored as: its roles and its
//! ordered steps. A step that carries `columns` has already been trained.

use crate::error::{RecipeError, Result as RecipeResult};
use crate::recipe::Recipe;
use crate::schema::SchemaInfo;
use crate::selector::Selector;
use crate::step::Step;
use crate::steps::{CheckMissing, CheckMissingOptions};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Current recipe spec version
pub const SPEC_VERSION: &str = "0.1";

/// Root recipe specification structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSpec {
    /// Specification version for future migrations
    pub version: String,

    /// Human-readable recipe name
    pub name: String,

    /// Role name to the columns that carry it. Unlisted columns are predictors.
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,

    /// Ordered sequence of steps
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl RecipeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            name: name.into(),
            roles: BTreeMap::new(),
            steps: Vec::new(),
        }
    }

    /// Load a recipe spec from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse a recipe spec from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse recipe JSON")
    }

    /// Save recipe spec to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write recipe file {}", path.display()))
    }

    /// Serialize recipe spec to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize recipe spec")
    }

    /// True when every step carries its resolved columns.
    pub fn is_trained(&self) -> bool {
        self.steps.iter().all(StepSpec::is_trained)
    }

    /// Build a recipe over `template`, applying the declared roles.
    ///
    /// Steps without an `id` get a fresh one.
    pub fn build(&self, template: SchemaInfo) -> RecipeResult<Recipe> {
        if self.version != SPEC_VERSION {
            return Err(RecipeError::Spec(format!(
                "Unsupported spec version '{}', expected '{SPEC_VERSION}'",
                self.version
            )));
        }

        let has_template = !template.is_empty();
        let steps = self.steps.iter().cloned().map(StepSpec::into_step).collect();
        let mut recipe = Recipe::from_parts(self.name.clone(), template, steps);

        // A trained recipe may be rebuilt without data; roles only matter for prep.
        if has_template {
            for (role, columns) in &self.roles {
                recipe = recipe.update_role(columns, role)?;
            }
        }
        Ok(recipe)
    }
}

/// Individual recipe step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StepSpec {
    /// Fail when any selected column contains missing values
    CheckMissing {
        selectors: Vec<Selector>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
        #[serde(default)]
        skip: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Resolved columns, present once the step is trained.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<Vec<String>>,
    },
}

impl StepSpec {
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::CheckMissing { id, .. } => id.as_deref(),
        }
    }

    pub fn selectors(&self) -> &[Selector] {
        match self {
            Self::CheckMissing { selectors, .. } => selectors,
        }
    }

    /// Resolved columns of a trained step.
    pub fn columns(&self) -> Option<&[String]> {
        match self {
            Self::CheckMissing { columns, .. } => columns.as_deref(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.columns().is_some()
    }

    /// Instantiate the step this spec describes.
    pub fn into_step(self) -> Box<dyn Step> {
        match self {
            Self::CheckMissing {
                selectors,
                role,
                skip,
                id,
                columns,
            } => {
                let options = CheckMissingOptions { role, skip, id };
                match columns {
                    Some(columns) => Box::new(CheckMissing::trained(selectors, columns, options)),
                    None => Box::new(CheckMissing::new(selectors, options)),
                }
            }
        }
    }
}
