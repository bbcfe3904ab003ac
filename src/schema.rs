//! Schema information consumed by the prepare phase.
//!
//! A [`SchemaInfo`] describes column identities, types and roles only. It is
//! built from a frame's schema, so preparing a step can never depend on the
//! row values of the training data.

use polars::prelude::*;

/// Role assigned to columns that have not been given one explicitly.
pub const DEFAULT_ROLE: &str = "predictor";

/// Role used for target columns.
pub const OUTCOME_ROLE: &str = "outcome";

/// Name, type and role of a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: DataType,
    pub role: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            role: Some(DEFAULT_ROLE.to_owned()),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    /// Numeric in the recipe sense: integers, unsigned integers and floats.
    pub fn is_numeric(&self) -> bool {
        self.dtype.is_primitive_numeric()
    }

    /// Nominal in the recipe sense: strings, categoricals, enums and booleans.
    pub fn is_nominal(&self) -> bool {
        matches!(self.dtype, DataType::String | DataType::Boolean)
            || self.dtype.is_categorical()
            || self.dtype.is_enum()
    }
}

/// Ordered column metadata for a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaInfo {
    columns: Vec<ColumnInfo>,
}

impl SchemaInfo {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    /// Build schema info from a polars schema, assigning the default role.
    pub fn from_schema(schema: &Schema) -> Self {
        let columns = schema
            .iter()
            .map(|(name, dtype)| ColumnInfo::new(name.as_str(), dtype.clone()))
            .collect();
        Self { columns }
    }

    /// Build schema info from a frame. Only the frame's schema is read.
    pub fn from_frame(df: &DataFrame) -> Self {
        Self::from_schema(df.schema())
    }

    /// Re-derive this schema for a new frame, carrying over roles by column name.
    ///
    /// Columns unknown to `self` get the default role.
    pub fn with_frame(&self, df: &DataFrame) -> Self {
        let mut fresh = Self::from_frame(df);
        for column in &mut fresh.columns {
            if let Some(known) = self.get(&column.name) {
                column.role.clone_from(&known.role);
            }
        }
        fresh
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Assign `role` to the named columns. Returns the names that were not found.
    pub fn update_role<'a>(&mut self, names: &'a [String], role: &str) -> Vec<&'a str> {
        let mut unknown = Vec::new();
        for name in names {
            match self.columns.iter_mut().find(|c| &c.name == name) {
                Some(column) => column.role = Some(role.to_owned()),
                None => unknown.push(name.as_str()),
            }
        }
        unknown
    }

    /// Count of columns per role, in first-seen order.
    pub fn role_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for column in &self.columns {
            let role = column.role.clone().unwrap_or_else(|| "none".to_owned());
            match counts.iter_mut().find(|(r, _)| *r == role) {
                Some((_, n)) => *n += 1,
                None => counts.push((role, 1)),
            }
        }
        counts
    }
}
