//! Error types for recipe preparation and baking.
//!
//! The library core returns [`RecipeError`] so a pipeline driver can tell the
//! failure kinds apart with a `match`:
//!
//! ```
//! use recipe_checks::error::RecipeError;
//!
//! fn report(err: &RecipeError) -> &'static str {
//!     match err {
//!         RecipeError::MissingValues { .. } => "invalid data, halted",
//!         RecipeError::NotTrained { .. } | RecipeError::ColumnNotFound { .. } => {
//!             "apply-time contract violation"
//!         }
//!         RecipeError::Selection(_) => "training aborted",
//!         _ => "other failure",
//!     }
//! }
//! ```
//!
//! Application layers (executor, CLI) wrap these in `anyhow::Error` and add
//! context as they propagate.

use std::fmt;

/// A column that failed the missing-value check, with its missing cell count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub name: String,
    pub count: usize,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.name)
    }
}

/// Main error type for recipe operations.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// A selector could not be resolved against the training schema.
    #[error("Selection error: {0}")]
    Selection(String),

    /// `bake` was called on a step that has not been prepared.
    #[error("Step `{step}` has not been trained; call prep() before bake()")]
    NotTrained { step: String },

    /// One or more checked columns contain missing values.
    #[error("The following columns contain missing values: {}.", join_quoted(.columns))]
    MissingValues { columns: Vec<MissingColumn> },

    /// A column resolved at training time is absent from the baked dataset.
    #[error("Column `{column}` required by step `{step}` is not present in the data")]
    ColumnNotFound { column: String, step: String },

    /// Malformed or unsupported recipe specification.
    #[error("Invalid recipe spec: {0}")]
    Spec(String),

    /// Polars failures while reading frames or building tidy output.
    #[error("Data processing error: {0}")]
    Data(#[from] polars::error::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RecipeError {
    /// Names of the offending columns for a [`RecipeError::MissingValues`], in check order.
    pub fn missing_columns(&self) -> Vec<&str> {
        match self {
            Self::MissingValues { columns } => columns.iter().map(|c| c.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_quoted(columns: &[MissingColumn]) -> String {
    columns
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for recipe operations.
pub type Result<T> = std::result::Result<T, RecipeError>;
