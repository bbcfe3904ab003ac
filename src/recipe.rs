//! A recipe: an ordered sequence of steps over a template schema.
//!
//! ```
//! use polars::prelude::*;
//! use recipe_checks::recipe::Recipe;
//! use recipe_checks::selector::Selector;
//! use recipe_checks::steps::CheckMissingOptions;
//!
//! let train = df! {
//!     "Age" => [31i64, 45],
//!     "Expenses" => [980.0f64, 1_120.5],
//! }?;
//!
//! let recipe = Recipe::from_frame("budget", &train).check_missing(
//!     vec![Selector::name("Age"), Selector::name("Expenses")],
//!     CheckMissingOptions::default(),
//! );
//!
//! let trained = recipe.prep(&train)?;
//! let baked = trained.bake(train.clone())?;
//! assert!(baked.equals(&train));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{RecipeError, Result};
use crate::pipeline::spec::{RecipeSpec, SPEC_VERSION};
use crate::schema::{DEFAULT_ROLE, SchemaInfo};
use crate::selector::Selector;
use crate::step::Step;
use crate::steps::{CheckMissing, CheckMissingOptions};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Ordered steps plus the schema (and roles) they were declared against.
#[derive(Debug)]
pub struct Recipe {
    name: String,
    template: SchemaInfo,
    steps: Vec<Box<dyn Step>>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, template: SchemaInfo) -> Self {
        Self {
            name: name.into(),
            template,
            steps: Vec::new(),
        }
    }

    /// Start a recipe whose template schema is taken from `df`.
    pub fn from_frame(name: impl Into<String>, df: &DataFrame) -> Self {
        Self::new(name, SchemaInfo::from_frame(df))
    }

    pub(crate) fn from_parts(
        name: String,
        template: SchemaInfo,
        steps: Vec<Box<dyn Step>>,
    ) -> Self {
        Self {
            name,
            template,
            steps,
        }
    }

    /// Assign `role` to the named template columns.
    pub fn update_role(mut self, names: &[String], role: &str) -> Result<Self> {
        let unknown = self.template.update_role(names, role);
        if !unknown.is_empty() {
            return Err(RecipeError::Selection(format!(
                "Can't assign role `{role}` to columns that don't exist: {}",
                unknown.join(", ")
            )));
        }
        Ok(self)
    }

    /// Append any step to the end of the recipe.
    pub fn add_step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Declare a missing-value check on the columns `selectors` resolve to.
    pub fn check_missing(self, selectors: Vec<Selector>, options: CheckMissingOptions) -> Self {
        self.add_step(CheckMissing::new(selectors, options))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &SchemaInfo {
        &self.template
    }

    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when every step is trained. An empty recipe counts as trained.
    pub fn is_trained(&self) -> bool {
        self.steps.iter().all(|s| s.is_trained())
    }

    /// Train every step against the schema of `training`, in declaration order.
    ///
    /// Each step sees the schema produced by the steps before it. Row values
    /// of `training` are never read. Returns a new recipe; `self` is unchanged.
    pub fn prep(&self, training: &DataFrame) -> Result<Self> {
        let template = self.template.with_frame(training);
        let mut schema = template.clone();
        let mut steps = Vec::with_capacity(self.steps.len());

        for (idx, step) in self.steps.iter().enumerate() {
            let prepared = step.prepare(&schema).map_err(|e| {
                tracing::error!(step = idx + 1, id = step.id(), "prep failed: {e}");
                e
            })?;
            schema = prepared.schema;
            steps.push(prepared.step);
        }

        tracing::info!(
            recipe = %self.name,
            steps = steps.len(),
            columns = template.len(),
            "recipe trained"
        );

        Ok(Self {
            name: self.name.clone(),
            template,
            steps,
        })
    }

    /// Apply every non-skipped step to `data`, in order.
    ///
    /// Stops at the first failing step; no partially processed frame is returned.
    pub fn bake(&self, data: DataFrame) -> Result<DataFrame> {
        if let Some(untrained) = self.steps.iter().find(|s| !s.is_trained()) {
            return Err(RecipeError::NotTrained {
                step: untrained.id().to_owned(),
            });
        }

        let mut current = data;
        for step in &self.steps {
            if step.skip() {
                tracing::debug!(id = step.id(), "skipping step on bake");
                continue;
            }
            current = step.bake(current)?;
        }
        Ok(current)
    }

    /// Bake independent datasets concurrently with this (trained) recipe.
    ///
    /// Results are returned in input order. A panic in a worker is resumed
    /// on the calling thread.
    pub fn bake_many(&self, datasets: Vec<DataFrame>) -> Vec<Result<DataFrame>> {
        std::thread::scope(|s| {
            let handles: Vec<_> = datasets
                .into_iter()
                .map(|df| s.spawn(move || self.bake(df)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
                .collect()
        })
    }

    /// One row per step: `number`, `operation`, `type`, `trained`, `skip`, `id`.
    pub fn tidy(&self) -> Result<DataFrame> {
        let number: Vec<u64> = (1..).take(self.steps.len()).collect();
        let operation: Vec<&str> = self.steps.iter().map(|s| s.operation().as_str()).collect();
        let step_type: Vec<&str> = self.steps.iter().map(|s| s.step_type()).collect();
        let trained: Vec<bool> = self.steps.iter().map(|s| s.is_trained()).collect();
        let skip: Vec<bool> = self.steps.iter().map(|s| s.skip()).collect();
        let id: Vec<&str> = self.steps.iter().map(|s| s.id()).collect();

        Ok(df! {
            "number" => number,
            "operation" => operation,
            "type" => step_type,
            "trained" => trained,
            "skip" => skip,
            "id" => id,
        }?)
    }

    /// Tidy output of the step at 1-based position `number`.
    pub fn tidy_step(&self, number: usize) -> Result<DataFrame> {
        number
            .checked_sub(1)
            .and_then(|idx| self.steps.get(idx))
            .ok_or_else(|| {
                RecipeError::Spec(format!(
                    "Recipe has {} steps; there is no step number {number}",
                    self.steps.len()
                ))
            })?
            .tidy()
    }

    /// Serializable form of this recipe, trained state included.
    pub fn to_spec(&self) -> RecipeSpec {
        let mut roles: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for column in self.template.columns() {
            if let Some(role) = column.role.as_deref()
                && role != DEFAULT_ROLE
            {
                roles
                    .entry(role.to_owned())
                    .or_default()
                    .push(column.name.clone());
            }
        }

        RecipeSpec {
            version: SPEC_VERSION.to_owned(),
            name: self.name.clone(),
            roles,
            steps: self.steps.iter().map(|s| s.to_spec()).collect(),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recipe: {}", self.name)?;
        writeln!(f)?;
        writeln!(f, "Inputs:")?;
        if self.template.is_empty() {
            writeln!(f, "  <unknown>")?;
        }
        for (role, count) in self.template.role_counts() {
            writeln!(f, "  {role:<12} {count}")?;
        }
        writeln!(f)?;
        write!(f, "Operations:")?;
        if self.steps.is_empty() {
            write!(f, "\n  <none>")?;
        }
        for (idx, step) in self.steps.iter().enumerate() {
            write!(f, "\n  {}. {step}", idx + 1)?;
        }
        Ok(())
    }
}
