//! Persisted recipes and headless execution.
//!
//! A recipe is stored as a versioned JSON "recipe spec". Specs are validated
//! against the training data's schema, trained, and then used to check any
//! number of datasets.
//!
//! # Example
//!
//! ```no_run
//! use recipe_checks::config::Settings;
//! use recipe_checks::pipeline::{RecipeSpec, run_check};
//! use std::path::PathBuf;
//!
//! let spec = RecipeSpec::from_file("loans.recipe.json")?;
//! let report = run_check(
//!     &spec,
//!     &Settings::default(),
//!     "train.csv",
//!     &[PathBuf::from("march.csv"), PathBuf::from("april.csv")],
//! )?;
//! println!("{}", report.summary());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Spec format
//!
//! ```json
//! {
//!   "version": "0.1",
//!   "name": "loans",
//!   "roles": { "outcome": ["Default"] },
//!   "steps": [
//!     { "op": "check_missing", "selectors": ["all_predictors()", "-Notes"] }
//!   ]
//! }
//! ```

pub mod executor;
pub mod spec;
pub mod validation;

pub use executor::{
    DatasetOutcome, RunReport, bake_files, load_trained, prep_recipe, run_bake, run_check,
};
pub use spec::{RecipeSpec, SPEC_VERSION, StepSpec};
pub use validation::{ValidationError, validate_recipe};
