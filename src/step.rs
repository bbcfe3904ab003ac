//! The step plugin interface.
//!
//! Every recipe operation follows the same lifecycle:
//!
//! ```text
//! declare ──> Untrained ──prepare(schema)──> Trained ──bake(data)──> data | error
//!                 │                             │
//!                 └──────── tidy / Display ─────┘
//! ```
//!
//! `prepare` never mutates the step; it returns a new trained step together
//! with the schema the next step should be prepared against.

use crate::error::Result;
use crate::pipeline::spec::StepSpec;
use crate::schema::SchemaInfo;
use polars::prelude::DataFrame;
use std::fmt;

/// Kind of operation a step performs, as reported by recipe-level tidy output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Transforms the data.
    Step,
    /// Validates the data and passes it through unchanged.
    Check,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Check => "check",
        }
    }
}

/// Result of preparing a step: the trained step plus the schema it produces.
#[derive(Debug)]
pub struct Prepared {
    pub step: Box<dyn Step>,
    pub schema: SchemaInfo,
}

/// A trainable recipe operation.
///
/// `Display` renders the step the way a recipe printout shows it.
pub trait Step: fmt::Display + fmt::Debug + Send + Sync {
    /// Unique identifier of this step within its recipe.
    fn id(&self) -> &str;

    fn operation(&self) -> Operation;

    /// Short type name, e.g. `"missing"`.
    fn step_type(&self) -> &'static str;

    fn is_trained(&self) -> bool;

    /// Whether the recipe should bypass this step when baking new data.
    fn skip(&self) -> bool;

    /// Resolve the step against `schema`, returning a trained copy and the output schema.
    fn prepare(&self, schema: &SchemaInfo) -> Result<Prepared>;

    /// Apply the trained step to `data`.
    fn bake(&self, data: DataFrame) -> Result<DataFrame>;

    /// Structured summary of the step's current state.
    fn tidy(&self) -> Result<DataFrame>;

    /// Serializable form, preserving trained state.
    fn to_spec(&self) -> StepSpec;
}
