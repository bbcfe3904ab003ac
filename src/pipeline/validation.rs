//! Recipe specification validation.
//!
//! Validates recipe specs against a training data schema before prep,
//! collecting every problem instead of stopping at the first one.

use super::spec::{RecipeSpec, SPEC_VERSION, StepSpec};
use crate::schema::SchemaInfo;
use crate::selector;
use std::collections::HashSet;

/// Validation error with helpful context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub step_index: Option<usize>,
    pub message: String,
}

impl ValidationError {
    fn new(step_index: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            step_index,
            message: message.into(),
        }
    }

    fn step(step_index: usize, message: impl Into<String>) -> Self {
        Self::new(Some(step_index), message)
    }

    fn recipe(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(idx) = self.step_index {
            write!(f, "Step {}: {}", idx + 1, self.message)
        } else {
            write!(f, "Recipe: {}", self.message)
        }
    }
}

/// Validate a recipe spec against the schema of its training data
pub fn validate_recipe(spec: &RecipeSpec, schema: &SchemaInfo) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.version != SPEC_VERSION {
        errors.push(ValidationError::recipe(format!(
            "Unsupported spec version '{}', expected '{SPEC_VERSION}'",
            spec.version
        )));
    }

    let mut schema = schema.clone();
    for (role, columns) in &spec.roles {
        for unknown in schema.update_role(columns, role) {
            errors.push(ValidationError::recipe(format!(
                "Role '{role}' names non-existent column '{unknown}'"
            )));
        }
    }

    let mut seen_ids = HashSet::new();
    for (idx, step) in spec.steps.iter().enumerate() {
        if let Some(id) = step.id()
            && !seen_ids.insert(id)
        {
            errors.push(ValidationError::step(idx, format!("Duplicate step id '{id}'")));
        }
        validate_step(step, idx, &schema, &mut errors);
    }

    errors
}

/// Validate a single step against the schema it would be prepared with
fn validate_step(
    step: &StepSpec,
    idx: usize,
    schema: &SchemaInfo,
    errors: &mut Vec<ValidationError>,
) {
    match step {
        StepSpec::CheckMissing {
            selectors,
            columns: None,
            ..
        } => {
            if let Err(e) = selector::resolve(selectors, schema) {
                errors.push(ValidationError::step(idx, e.to_string()));
            }
        }
        StepSpec::CheckMissing {
            columns: Some(columns),
            ..
        } => {
            for col in columns {
                if !schema.contains(col) {
                    errors.push(ValidationError::step(
                        idx,
                        format!("Cannot check non-existent column '{col}'"),
                    ));
                }
            }
        }
    }
}
