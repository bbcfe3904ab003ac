//! Column selectors and their resolution against a schema.
//!
//! Selectors are stored verbatim when a step is declared and resolved to
//! concrete column names once, when the step is prepared.
//!
//! # Grammar
//!
//! ```text
//! Age                     exact column name
//! `Income (USD)`          exact column name, quoted
//! starts_with("inc")      name prefix
//! ends_with("_id")        name suffix
//! contains("rate")        name substring
//! matches("^x[0-9]+$")    name regex
//! all_numeric()           numeric columns
//! all_nominal()           string, categorical and boolean columns
//! all_predictors()        columns with role "predictor"
//! all_outcomes()          columns with role "outcome"
//! has_role("id")          columns with the given role
//! everything()            all columns
//! -<selector>             exclude what <selector> matches
//! ```
//!
//! Names that contain parentheses or start with `-` must be backtick-quoted.
//! `Display` also quotes names with quotes, backslashes or edge whitespace.
//! Inside a quoted name or string argument, `\` escapes the quote character
//! and itself.

use crate::error::{RecipeError, Result};
use crate::schema::{ColumnInfo, DEFAULT_ROLE, OUTCOME_ROLE, SchemaInfo};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single column selection expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    Name(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    Matches(String),
    AllNumeric,
    AllNominal,
    AllPredictors,
    AllOutcomes,
    HasRole(String),
    Everything,
    Exclude(Box<Selector>),
}

impl Selector {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Exclude whatever `self` matches.
    pub fn negate(self) -> Self {
        Self::Exclude(Box::new(self))
    }

    pub fn is_exclusion(&self) -> bool {
        matches!(self, Self::Exclude(_))
    }

    /// Columns of `schema` this selector matches, in schema order.
    ///
    /// For [`Selector::Exclude`] these are the columns to remove.
    fn matching<'s>(&self, schema: &'s SchemaInfo) -> Result<Vec<&'s str>> {
        let by = |pred: &dyn Fn(&ColumnInfo) -> bool| -> Vec<&'s str> {
            schema
                .columns()
                .iter()
                .filter(|c| pred(c))
                .map(|c| c.name.as_str())
                .collect()
        };

        let matched = match self {
            Self::Name(name) => match schema.get(name) {
                Some(column) => vec![column.name.as_str()],
                None => {
                    return Err(RecipeError::Selection(format!(
                        "Can't select columns that don't exist: `{name}`"
                    )));
                }
            },
            Self::StartsWith(prefix) => by(&|c: &ColumnInfo| c.name.starts_with(prefix.as_str())),
            Self::EndsWith(suffix) => by(&|c: &ColumnInfo| c.name.ends_with(suffix.as_str())),
            Self::Contains(needle) => by(&|c: &ColumnInfo| c.name.contains(needle.as_str())),
            Self::Matches(pattern) => {
                let re = Regex::new(pattern).map_err(|e| {
                    RecipeError::Selection(format!("Invalid regex in matches(\"{pattern}\"): {e}"))
                })?;
                by(&|c: &ColumnInfo| re.is_match(&c.name))
            }
            Self::AllNumeric => by(&ColumnInfo::is_numeric),
            Self::AllNominal => by(&ColumnInfo::is_nominal),
            Self::AllPredictors => by(&|c: &ColumnInfo| c.has_role(DEFAULT_ROLE)),
            Self::AllOutcomes => by(&|c: &ColumnInfo| c.has_role(OUTCOME_ROLE)),
            Self::HasRole(role) => by(&|c: &ColumnInfo| c.has_role(role)),
            Self::Everything => by(&|_: &ColumnInfo| true),
            Self::Exclude(inner) => inner.matching(schema)?,
        };
        Ok(matched)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) if needs_quoting(name) => write!(f, "{}", quote(name, '`')),
            Self::Name(name) => write!(f, "{name}"),
            Self::StartsWith(s) => write!(f, "starts_with({})", quote(s, '"')),
            Self::EndsWith(s) => write!(f, "ends_with({})", quote(s, '"')),
            Self::Contains(s) => write!(f, "contains({})", quote(s, '"')),
            Self::Matches(s) => write!(f, "matches({})", quote(s, '"')),
            Self::AllNumeric => write!(f, "all_numeric()"),
            Self::AllNominal => write!(f, "all_nominal()"),
            Self::AllPredictors => write!(f, "all_predictors()"),
            Self::AllOutcomes => write!(f, "all_outcomes()"),
            Self::HasRole(role) => write!(f, "has_role({})", quote(role, '"')),
            Self::Everything => write!(f, "everything()"),
            Self::Exclude(inner) => write!(f, "-{inner}"),
        }
    }
}

impl FromStr for Selector {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if text.is_empty() {
            return Err(RecipeError::Selection("empty selector".to_owned()));
        }

        if let Some(rest) = text.strip_prefix('-') {
            return Ok(rest.parse::<Self>()?.negate());
        }

        if text.starts_with('`') {
            return unquote(text, '`').map(Self::Name).ok_or_else(|| {
                RecipeError::Selection(format!("Unterminated quoted column name `{text}`"))
            });
        }

        let Some((func, rest)) = text.split_once('(') else {
            return Ok(Self::Name(text.to_owned()));
        };
        let args = rest.strip_suffix(')').ok_or_else(|| {
            RecipeError::Selection(format!("Unbalanced parentheses in selector `{text}`"))
        })?;
        let args = args.trim();

        let no_args = |sel: Self| {
            if args.is_empty() {
                Ok(sel)
            } else {
                Err(RecipeError::Selection(format!(
                    "{func}() takes no arguments, got `{args}`"
                )))
            }
        };

        match func.trim() {
            "starts_with" => Ok(Self::StartsWith(string_arg(func, args)?)),
            "ends_with" => Ok(Self::EndsWith(string_arg(func, args)?)),
            "contains" => Ok(Self::Contains(string_arg(func, args)?)),
            "matches" => Ok(Self::Matches(string_arg(func, args)?)),
            "has_role" => Ok(Self::HasRole(string_arg(func, args)?)),
            "all_numeric" => no_args(Self::AllNumeric),
            "all_nominal" => no_args(Self::AllNominal),
            "all_predictors" => no_args(Self::AllPredictors),
            "all_outcomes" => no_args(Self::AllOutcomes),
            "everything" => no_args(Self::Everything),
            other => Err(RecipeError::Selection(format!(
                "Unknown selector function `{other}()`"
            ))),
        }
    }
}

/// Parse a single double-quoted string argument.
fn string_arg(func: &str, args: &str) -> Result<String> {
    unquote(args, '"').ok_or_else(|| {
        RecipeError::Selection(format!(
            "{func}() expects one quoted string argument, got `{args}`"
        ))
    })
}

/// Bare names that would read back as something else are written quoted.
fn needs_quoting(name: &str) -> bool {
    name.is_empty()
        || name.starts_with('-')
        || name.starts_with(char::is_whitespace)
        || name.ends_with(char::is_whitespace)
        || name.contains(['(', ')', '"', '`', '\\'])
}

/// Wrap `text` in `q`, escaping `q` and backslashes.
fn quote(text: &str, q: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(q);
    for c in text.chars() {
        if c == q || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(q);
    out
}

/// Inverse of [`quote`]. The closing quote must end `text`.
///
/// Only `\q` and `\\` are escapes; any other backslash is kept, so
/// regex classes such as `\d` need no doubling.
fn unquote(text: &str, q: char) -> Option<String> {
    let mut chars = text.strip_prefix(q)?.chars().peekable();
    let mut out = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next_if(|&n| n == q || n == '\\') {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            c if c == q => return chars.next().is_none().then_some(out),
            c => out.push(c),
        }
    }
    None
}

impl TryFrom<String> for Selector {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

/// Parse a list of selector strings.
pub fn parse_selectors<S: AsRef<str>>(texts: &[S]) -> Result<Vec<Selector>> {
    texts.iter().map(|t| t.as_ref().parse()).collect()
}

/// Resolve an ordered selector list to concrete column names.
///
/// Inclusions append their matches (skipping columns already chosen);
/// exclusions remove theirs. A leading exclusion starts from every column.
/// An empty list resolves to no columns; a non-empty list that selects
/// nothing is an error.
pub fn resolve(selectors: &[Selector], schema: &SchemaInfo) -> Result<Vec<String>> {
    if selectors.is_empty() {
        return Ok(Vec::new());
    }

    let mut chosen: Vec<String> = match selectors.first() {
        Some(first) if first.is_exclusion() => schema.names().map(ToOwned::to_owned).collect(),
        _ => Vec::new(),
    };

    for selector in selectors {
        let matched = selector.matching(schema)?;
        if selector.is_exclusion() {
            chosen.retain(|name| !matched.contains(&name.as_str()));
        } else {
            for name in matched {
                if !chosen.iter().any(|c| c == name) {
                    chosen.push(name.to_owned());
                }
            }
        }
    }

    if chosen.is_empty() {
        let rendered: Vec<String> = selectors.iter().map(ToString::to_string).collect();
        return Err(RecipeError::Selection(format!(
            "No columns were selected by `{}`",
            rendered.join(", ")
        )));
    }

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnInfo;
    use polars::prelude::DataType;

    fn schema() -> SchemaInfo {
        let mut info = SchemaInfo::new(vec![
            ColumnInfo::new("id", DataType::Int64),
            ColumnInfo::new("Age", DataType::Int64),
            ColumnInfo::new("Income", DataType::Float64),
            ColumnInfo::new("Expenses", DataType::Float64),
            ColumnInfo::new("City", DataType::String),
            ColumnInfo::new("Owner", DataType::Boolean),
        ]);
        info.update_role(&["id".to_owned()], "id");
        info.update_role(&["Income".to_owned()], OUTCOME_ROLE);
        info
    }

    fn sel(text: &str) -> Selector {
        text.parse().expect("selector parses")
    }

    #[test]
    fn test_parse_and_display_agree() {
        for text in [
            "Age",
            "starts_with(\"Inc\")",
            "matches(\"^E.*s$\")",
            "all_numeric()",
            "has_role(\"id\")",
            "-all_outcomes()",
        ] {
            assert_eq!(sel(text).to_string(), text);
        }
        assert_eq!(sel("  -Age "), Selector::name("Age").negate());
    }

    #[test]
    fn test_parse_rejects_malformed_selectors() {
        assert!("".parse::<Selector>().is_err());
        assert!("starts_with(Inc)".parse::<Selector>().is_err());
        assert!("all_numeric(\"x\")".parse::<Selector>().is_err());
        assert!("everything(".parse::<Selector>().is_err());
        assert!("bogus()".parse::<Selector>().is_err());
    }

    #[test]
    fn test_resolution_follows_selector_order() -> Result<()> {
        let cols = resolve(&[sel("Expenses"), sel("Age")], &schema())?;
        assert_eq!(cols, vec!["Expenses", "Age"]);
        Ok(())
    }

    #[test]
    fn test_predicates_resolve_in_schema_order_without_duplicates() -> Result<()> {
        let cols = resolve(&[sel("Income"), sel("all_numeric()")], &schema())?;
        assert_eq!(cols, vec!["Income", "id", "Age", "Expenses"]);
        Ok(())
    }

    #[test]
    fn test_role_selectors() -> Result<()> {
        let s = schema();
        assert_eq!(resolve(&[sel("all_outcomes()")], &s)?, vec!["Income"]);
        assert_eq!(resolve(&[sel("has_role(\"id\")")], &s)?, vec!["id"]);
        assert_eq!(
            resolve(&[sel("all_predictors()")], &s)?,
            vec!["Age", "Expenses", "City", "Owner"]
        );
        assert_eq!(resolve(&[sel("all_nominal()")], &s)?, vec!["City", "Owner"]);
        Ok(())
    }

    #[test]
    fn test_exclusions() -> Result<()> {
        let s = schema();
        assert_eq!(
            resolve(&[sel("all_numeric()"), sel("-has_role(\"id\")")], &s)?,
            vec!["Age", "Income", "Expenses"]
        );
        assert_eq!(
            resolve(&[sel("-all_numeric()")], &s)?,
            vec!["City", "Owner"]
        );
        Ok(())
    }

    #[test]
    fn test_unknown_name_is_selection_error() {
        let err = resolve(&[sel("Salary")], &schema());
        assert!(matches!(err, Err(RecipeError::Selection(msg)) if msg.contains("`Salary`")));
    }

    #[test]
    fn test_zero_matches_is_selection_error() {
        let err = resolve(&[sel("starts_with(\"zzz\")")], &schema());
        assert!(matches!(err, Err(RecipeError::Selection(_))));
    }

    #[test]
    fn test_invalid_regex_is_selection_error() {
        let err = resolve(&[sel("matches(\"[\")")], &schema());
        assert!(matches!(err, Err(RecipeError::Selection(_))));
    }

    #[test]
    fn test_empty_selection_resolves_to_nothing() -> Result<()> {
        assert!(resolve(&[], &schema())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_serde_uses_text_form() -> serde_json::Result<()> {
        let json = serde_json::to_string(&vec![sel("Age"), sel("-contains(\"x\")")])?;
        assert_eq!(json, r#"["Age","-contains(\"x\")"]"#);
        let back: Vec<Selector> = serde_json::from_str(&json)?;
        assert_eq!(back, vec![sel("Age"), sel("-contains(\"x\")")]);
        assert!(serde_json::from_str::<Selector>("\"nope(\"").is_err());
        Ok(())
    }

    #[test]
    fn test_awkward_names_survive_serde() -> serde_json::Result<()> {
        let selectors = vec![
            Selector::name("-delta"),
            Selector::name("x(1)"),
            Selector::name("Income (USD)"),
            Selector::name(" padded"),
            Selector::name("back`tick\\"),
            Selector::StartsWith("a\"b".to_owned()),
            Selector::HasRole("r\\".to_owned()),
            Selector::name("-delta").negate(),
        ];
        let json = serde_json::to_string(&selectors)?;
        let back: Vec<Selector> = serde_json::from_str(&json)?;
        assert_eq!(back, selectors);

        assert_eq!(Selector::name("-delta").to_string(), "`-delta`");
        assert_eq!(
            Selector::StartsWith("a\"b".to_owned()).to_string(),
            r#"starts_with("a\"b")"#
        );
        Ok(())
    }

    #[test]
    fn test_quoted_names_parse() -> Result<()> {
        assert_eq!(sel("`Income (USD)`"), Selector::name("Income (USD)"));
        assert_eq!(sel("-`-delta`"), Selector::name("-delta").negate());
        assert!("`open".parse::<Selector>().is_err());
        assert!("`a` b".parse::<Selector>().is_err());

        let s = SchemaInfo::new(vec![ColumnInfo::new("Income (USD)", DataType::Float64)]);
        assert_eq!(resolve(&[sel("`Income (USD)`")], &s)?, vec!["Income (USD)"]);
        Ok(())
    }

    #[test]
    fn test_regex_backslashes_need_no_doubling() -> Result<()> {
        assert_eq!(sel(r#"matches("^x\d+$")"#), Selector::Matches(r"^x\d+$".to_owned()));

        let s = SchemaInfo::new(vec![
            ColumnInfo::new("x1", DataType::Int64),
            ColumnInfo::new("xy", DataType::Int64),
        ]);
        assert_eq!(resolve(&[sel(r#"matches("^x\d+$")"#)], &s)?, vec!["x1"]);
        Ok(())
    }
}
