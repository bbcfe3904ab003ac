//! # recipe-checks - Data Quality Checks for Preprocessing Recipes
//!
//! A recipe is an ordered list of preprocessing steps declared against a
//! template schema. Steps are *prepared* (trained) once on training data
//! and then *baked* (applied) to any number of new datasets.
//!
//! This crate provides the recipe machinery and a missing-value check step:
//! a check that resolves its column selectors at prep time and, at bake
//! time, fails if any of those columns holds a missing value.
//!
//! ## Quick Start
//!
//! ```
//! use polars::prelude::*;
//! use recipe_checks::prelude::*;
//!
//! let train = df! {
//!     "Age" => [34i64, 51],
//!     "Income" => [41_000.0f64, 52_300.0],
//! }?;
//!
//! let trained = Recipe::from_frame("loans", &train)
//!     .check_missing(parse_selectors(&["all_numeric()"])?, CheckMissingOptions::default())
//!     .prep(&train)?;
//!
//! let new_data = df! {
//!     "Age" => [Some(29i64), None],
//!     "Income" => [Some(39_900.0f64), Some(47_000.0)],
//! }?;
//!
//! match trained.bake(new_data) {
//!     Err(RecipeError::MissingValues { columns }) => assert_eq!(columns[0].name, "Age"),
//!     other => panic!("expected a missing-value failure, got {other:?}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`schema`]: column names, types and roles seen at prep time
//! - [`selector`]: column selector grammar and resolution
//! - [`step`]: the step lifecycle trait
//! - [`steps`]: concrete steps, currently [`steps::CheckMissing`]
//! - [`recipe`]: the recipe container that preps and bakes steps in order
//! - [`pipeline`]: JSON recipe specs, validation and headless execution
//! - [`error`]: error types

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod recipe;
pub mod schema;
pub mod selector;
pub mod step;
pub mod steps;

/// Commonly used types.
pub mod prelude {
    pub use crate::error::{MissingColumn, RecipeError};
    pub use crate::recipe::Recipe;
    pub use crate::schema::{ColumnInfo, SchemaInfo};
    pub use crate::selector::{Selector, parse_selectors, resolve};
    pub use crate::step::{Operation, Prepared, Step};
    pub use crate::steps::{CheckMissing, CheckMissingOptions};
}
