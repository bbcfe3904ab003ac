//! Check that selected columns contain no missing values.
//!
//! The check is declared with selectors, resolved to concrete columns when
//! prepared, and then baked against any number of datasets. Baking either
//! returns the dataset untouched or fails with a
//! [`RecipeError::MissingValues`] naming every offending column.
//!
//! A cell is missing when it is null, or `NaN` in a floating point column.

use super::rand_id;
use crate::error::{MissingColumn, RecipeError, Result};
use crate::pipeline::spec::StepSpec;
use crate::schema::SchemaInfo;
use crate::selector::{self, Selector};
use crate::step::{Operation, Prepared, Step};
use polars::prelude::*;
use std::fmt;

/// Resolution state of a check's column selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Declared but not yet prepared; selectors are stored verbatim.
    Unresolved(Vec<Selector>),
    /// Prepared; `columns` is fixed for the rest of the step's life.
    Resolved {
        terms: Vec<Selector>,
        columns: Vec<String>,
    },
}

impl Selection {
    pub fn terms(&self) -> &[Selector] {
        match self {
            Self::Unresolved(terms) | Self::Resolved { terms, .. } => terms,
        }
    }

    pub fn columns(&self) -> Option<&[String]> {
        match self {
            Self::Unresolved(_) => None,
            Self::Resolved { columns, .. } => Some(columns),
        }
    }
}

/// Optional arguments when declaring a check.
#[derive(Debug, Clone, Default)]
pub struct CheckMissingOptions {
    /// Carried through but not interpreted by the check.
    pub role: Option<String>,
    pub skip: bool,
    /// Defaults to a random `missing_xxxxx` id.
    pub id: Option<String>,
}

/// The missing-value check step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMissing {
    selection: Selection,
    role: Option<String>,
    skip: bool,
    id: String,
}

impl CheckMissing {
    pub fn new(selectors: Vec<Selector>, options: CheckMissingOptions) -> Self {
        Self {
            selection: Selection::Unresolved(selectors),
            role: options.role,
            skip: options.skip,
            id: options.id.unwrap_or_else(|| rand_id("missing")),
        }
    }

    /// Rebuild a check in an already resolved state.
    pub fn trained(
        selectors: Vec<Selector>,
        columns: Vec<String>,
        options: CheckMissingOptions,
    ) -> Self {
        let mut step = Self::new(selectors, options);
        step.selection = Selection::Resolved {
            terms: step.selection.terms().to_vec(),
            columns,
        };
        step
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Resolved column names, `None` until prepared.
    pub fn columns(&self) -> Option<&[String]> {
        self.selection.columns()
    }

    /// Text shown for this step: resolved columns once trained, selector text before.
    fn terms_text(&self) -> Vec<String> {
        match &self.selection {
            Selection::Unresolved(terms) => terms.iter().map(ToString::to_string).collect(),
            Selection::Resolved { columns, .. } => columns.clone(),
        }
    }
}

/// Count missing cells in a column: nulls, plus `NaN`s for float columns.
pub fn count_missing(column: &Column) -> Result<usize> {
    let series = column.as_materialized_series();
    let nulls = series.null_count();
    let nans = match series.dtype() {
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .filter(|v| v.is_some_and(f64::is_nan))
            .count(),
        DataType::Float32 => series
            .f32()?
            .into_iter()
            .filter(|v| v.is_some_and(f32::is_nan))
            .count(),
        _ => 0,
    };
    Ok(nulls + nans)
}

impl Step for CheckMissing {
    fn id(&self) -> &str {
        &self.id
    }

    fn operation(&self) -> Operation {
        Operation::Check
    }

    fn step_type(&self) -> &'static str {
        "missing"
    }

    fn is_trained(&self) -> bool {
        matches!(self.selection, Selection::Resolved { .. })
    }

    fn skip(&self) -> bool {
        self.skip
    }

    fn prepare(&self, schema: &SchemaInfo) -> Result<Prepared> {
        let selection = match &self.selection {
            Selection::Unresolved(terms) => {
                let columns = selector::resolve(terms, schema)?;
                tracing::debug!(step = %self.id, ?columns, "resolved missing-value check");
                Selection::Resolved {
                    terms: terms.clone(),
                    columns,
                }
            }
            // Trained steps keep their columns.
            resolved @ Selection::Resolved { .. } => resolved.clone(),
        };

        let step = Self {
            selection,
            role: self.role.clone(),
            skip: self.skip,
            id: self.id.clone(),
        };
        Ok(Prepared {
            step: Box::new(step),
            schema: schema.clone(),
        })
    }

    fn bake(&self, data: DataFrame) -> Result<DataFrame> {
        let Selection::Resolved { columns, .. } = &self.selection else {
            return Err(RecipeError::NotTrained {
                step: self.id.clone(),
            });
        };

        let checked = columns
            .iter()
            .map(|name| {
                data.column(name)
                    .map(|column| (name, column))
                    .map_err(|_| RecipeError::ColumnNotFound {
                        column: name.clone(),
                        step: self.id.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut offending = Vec::new();
        for (name, column) in checked {
            let count = count_missing(column)?;
            if count > 0 {
                offending.push(MissingColumn {
                    name: name.clone(),
                    count,
                });
            }
        }

        if !offending.is_empty() {
            return Err(RecipeError::MissingValues { columns: offending });
        }

        tracing::debug!(step = %self.id, checked = columns.len(), "no missing values");
        Ok(data)
    }

    fn tidy(&self) -> Result<DataFrame> {
        let terms = self.terms_text();
        let ids = vec![self.id.clone(); terms.len()];
        Ok(df! {
            "terms" => terms,
            "id" => ids,
        }?)
    }

    fn to_spec(&self) -> StepSpec {
        StepSpec::CheckMissing {
            selectors: self.selection.terms().to_vec(),
            role: self.role.clone(),
            skip: self.skip,
            id: Some(self.id.clone()),
            columns: self.columns().map(<[String]>::to_vec),
        }
    }
}

impl fmt::Display for CheckMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms = self.terms_text();
        if terms.is_empty() {
            write!(f, "Check missing values for <none>")?;
        } else {
            write!(f, "Check missing values for {}", terms.join(", "))?;
        }
        if self.is_trained() {
            write!(f, " [trained]")?;
        }
        Ok(())
    }
}
