//! # Property-Based Tests
//!
//! Properties of the missing-value check over generated numeric frames.

use polars::prelude::*;
use proptest::collection::vec;
use proptest::prelude::*;
use recipe_checks::prelude::*;
use recipe_checks::selector::Selector;

type Values = Vec<Vec<Option<f64>>>;

/// Between one and four equally long columns, some cells missing.
fn values_strategy() -> impl Strategy<Value = Values> {
    (1usize..5, 0usize..12).prop_flat_map(|(cols, rows)| {
        vec(vec(proptest::option::weighted(0.85, -1e6f64..1e6), rows), cols)
    })
}

fn frame(values: &Values) -> DataFrame {
    let columns = values
        .iter()
        .enumerate()
        .map(|(i, v)| Column::new(format!("c{i}").into(), v.as_slice()))
        .collect();
    DataFrame::new(columns).expect("columns have equal length")
}

fn selected_names(values: &Values, mask: &[bool]) -> Vec<String> {
    (0..values.len())
        .filter(|&i| mask[i])
        .map(|i| format!("c{i}"))
        .collect()
}

fn trained_step(schema: &SchemaInfo, names: &[String]) -> Box<dyn Step> {
    let selectors = names.iter().map(Selector::name).collect();
    CheckMissing::new(selectors, CheckMissingOptions::default())
        .prepare(schema)
        .expect("named columns exist")
        .step
}

proptest! {
    /// Bake passes data through untouched, or names exactly the columns with gaps.
    #[test]
    fn bake_is_identity_or_reports_offending_columns(
        values in values_strategy(),
        mask in vec(any::<bool>(), 4),
    ) {
        let data = frame(&values);
        let names = selected_names(&values, &mask);
        let step = trained_step(&SchemaInfo::from_frame(&data), &names);

        let expected: Vec<&str> = names
            .iter()
            .filter(|name| {
                let idx: usize = name[1..].parse().expect("generated name");
                values[idx].iter().any(Option::is_none)
            })
            .map(String::as_str)
            .collect();

        match step.bake(data.clone()) {
            Ok(baked) => {
                prop_assert!(expected.is_empty());
                prop_assert!(baked.equals_missing(&data));
                prop_assert_eq!(baked.get_column_names(), data.get_column_names());
            }
            Err(err) => {
                prop_assert!(
                    matches!(err, RecipeError::MissingValues { .. }),
                    "expected a MissingValues error"
                );
                prop_assert_eq!(err.missing_columns(), expected);
            }
        }
    }

    /// Baking twice gives the same outcome as baking once.
    #[test]
    fn bake_is_repeatable(
        values in values_strategy(),
        mask in vec(any::<bool>(), 4),
    ) {
        let data = frame(&values);
        let names = selected_names(&values, &mask);
        let step = trained_step(&SchemaInfo::from_frame(&data), &names);

        match (step.bake(data.clone()), step.bake(data.clone())) {
            (Ok(first), Ok(second)) => {
                prop_assert!(first.equals_missing(&second));
                let again = step.bake(first).expect("clean output bakes again");
                prop_assert!(again.equals_missing(&second));
            }
            (Err(first), Err(second)) => {
                prop_assert_eq!(first.to_string(), second.to_string());
            }
            _ => prop_assert!(false, "outcomes differ between identical bakes"),
        }
    }

    /// Prepare resolves the same columns on every call.
    #[test]
    fn prepare_is_deterministic(
        values in values_strategy(),
        mask in vec(any::<bool>(), 4),
    ) {
        let schema = SchemaInfo::from_frame(&frame(&values));
        let names = selected_names(&values, &mask);

        let first = trained_step(&schema, &names).to_spec();
        let second = trained_step(&schema, &names).to_spec();
        prop_assert_eq!(first.columns(), second.columns());
        prop_assert_eq!(first.columns().unwrap_or_default(), names.as_slice());
    }

    /// Prep outcome depends on column names and types only, never on row values.
    #[test]
    fn prep_ignores_row_values(
        values in values_strategy(),
        mask in vec(any::<bool>(), 4),
    ) {
        let original = frame(&values);
        let filled: Values = values
            .iter()
            .map(|col| col.iter().map(|_| Some(0.0)).collect())
            .collect();
        let replaced = frame(&filled);

        let names = selected_names(&values, &mask);
        let selectors: Vec<Selector> = names.iter().map(Selector::name).collect();
        let recipe = Recipe::from_frame("props", &original)
            .check_missing(selectors, CheckMissingOptions {
                id: Some("missing_props".to_owned()),
                ..Default::default()
            });

        let a = recipe.prep(&original).expect("prep on original").to_spec();
        let b = recipe.prep(&replaced).expect("prep on replaced").to_spec();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn nonexistent_selection_fails_prepare() {
    let schema = SchemaInfo::from_frame(&frame(&vec![vec![Some(1.0)]]));
    let err = CheckMissing::new(vec![Selector::name("absent")], CheckMissingOptions::default())
        .prepare(&schema)
        .expect_err("no such column");
    assert!(matches!(err, RecipeError::Selection(_)));
}
