//! Recipe execution engine.
//!
//! Loads training data, trains a recipe spec against it, then bakes each
//! dataset with the trained recipe and reports a per-dataset outcome.

use super::spec::RecipeSpec;
use super::validation::validate_recipe;
use crate::config::Settings;
use crate::error::RecipeError;
use crate::io::load_df;
use crate::recipe::Recipe;
use crate::schema::SchemaInfo;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Result of baking a single dataset
#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub path: PathBuf,

    /// Number of rows read, `None` when the file could not be loaded
    pub rows: Option<usize>,

    /// Error message of the first failing step, `None` when the dataset passed
    pub error: Option<String>,

    /// Columns reported by a failed missing-value check
    pub missing_columns: Vec<String>,
}

impl DatasetOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }

    fn status(&self) -> String {
        match &self.error {
            None => "passed".to_owned(),
            Some(message) => message.clone(),
        }
    }
}

/// Report generated after a recipe run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Recipe name
    pub recipe: String,

    /// Number of trained steps
    pub steps: usize,

    /// One entry per dataset, in input order
    pub outcomes: Vec<DatasetOutcome>,

    /// Time taken for execution
    pub duration: std::time::Duration,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(DatasetOutcome::passed)
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "Recipe '{}' ({} steps): {} of {} datasets passed, {:.2}s",
            self.recipe,
            self.steps,
            self.outcomes.len() - self.failed(),
            self.outcomes.len(),
            self.duration.as_secs_f64()
        )];
        lines.extend(
            self.outcomes
                .iter()
                .map(|o| format!("  {}: {}", o.path.display(), o.status())),
        );
        lines.join("\n")
    }
}

/// Load the training file, validate the spec against it, and train the recipe
pub fn prep_recipe(spec: &RecipeSpec, settings: &Settings, train_path: &Path) -> Result<Recipe> {
    let train = load_df(train_path, &settings.input).context("Failed to load training file")?;
    let schema = SchemaInfo::from_frame(&train);

    let validation_errors = validate_recipe(spec, &schema);
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(
            "Recipe validation failed:\n{}",
            validation_errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        ));
    }

    let recipe = spec.build(schema)?;
    recipe
        .prep(&train)
        .with_context(|| format!("Failed to prep recipe '{}'", spec.name))
}

/// Rebuild an already trained recipe spec without training data
pub fn load_trained(spec: &RecipeSpec) -> Result<Recipe> {
    if !spec.is_trained() {
        return Err(anyhow::anyhow!(
            "Recipe '{}' is not trained; run `prep` first",
            spec.name
        ));
    }
    Ok(spec.build(SchemaInfo::default())?)
}

/// Bake each dataset with a trained recipe.
///
/// Every file is loaded first, then the loaded frames are baked concurrently.
/// A dataset that fails to load or fails a step is reported and the run
/// continues with the next one. Outcomes keep the order of `data_paths`.
pub fn bake_files(
    recipe: &Recipe,
    settings: &Settings,
    data_paths: &[PathBuf],
) -> Vec<DatasetOutcome> {
    let mut outcomes = Vec::with_capacity(data_paths.len());
    let mut loaded = Vec::new();
    let mut frames = Vec::new();
    for path in data_paths {
        let (rows, error) = match load_df(path, &settings.input) {
            Err(e) => (None, Some(format!("{e:#}"))),
            Ok(df) => {
                loaded.push(outcomes.len());
                let rows = Some(df.height());
                frames.push(df);
                (rows, None)
            }
        };
        outcomes.push(DatasetOutcome {
            path: path.clone(),
            rows,
            error,
            missing_columns: Vec::new(),
        });
    }

    for (slot, result) in loaded.into_iter().zip(recipe.bake_many(frames)) {
        if let Err(e) = result {
            let outcome = &mut outcomes[slot];
            outcome.missing_columns = missing_columns(&e);
            outcome.error = Some(e.to_string());
        }
    }

    for outcome in &outcomes {
        match &outcome.error {
            None => tracing::info!(path = %outcome.path.display(), "dataset passed"),
            Some(e) => tracing::warn!(path = %outcome.path.display(), "dataset failed: {e}"),
        }
    }
    outcomes
}

fn missing_columns(err: &RecipeError) -> Vec<String> {
    err.missing_columns().into_iter().map(ToOwned::to_owned).collect()
}

/// Train `spec` on `train_path`, then check every file in `data_paths`
pub fn run_check(
    spec: &RecipeSpec,
    settings: &Settings,
    train_path: impl AsRef<Path>,
    data_paths: &[PathBuf],
) -> Result<RunReport> {
    let start = std::time::Instant::now();

    let recipe = prep_recipe(spec, settings, train_path.as_ref())?;
    let outcomes = bake_files(&recipe, settings, data_paths);

    let report = RunReport {
        recipe: recipe.name().to_owned(),
        steps: recipe.len(),
        outcomes,
        duration: start.elapsed(),
    };
    tracing::info!(
        recipe = %report.recipe,
        failed = report.failed(),
        total = report.outcomes.len(),
        "check finished"
    );
    Ok(report)
}

/// Check every file in `data_paths` with an already trained recipe spec
pub fn run_bake(
    spec: &RecipeSpec,
    settings: &Settings,
    data_paths: &[PathBuf],
) -> Result<RunReport> {
    let start = std::time::Instant::now();

    let recipe = load_trained(spec)?;
    let outcomes = bake_files(&recipe, settings, data_paths);

    Ok(RunReport {
        recipe: recipe.name().to_owned(),
        steps: recipe.len(),
        outcomes,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::spec::StepSpec;
    use crate::selector::Selector;
    use std::io::Write as _;

    fn write_csv(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(content.as_bytes())?;
        Ok(path)
    }

    fn spec_for(selectors: Vec<Selector>) -> RecipeSpec {
        let mut spec = RecipeSpec::new("test");
        spec.steps.push(StepSpec::CheckMissing {
            selectors,
            role: None,
            skip: false,
            id: Some("missing_test".to_owned()),
            columns: None,
        });
        spec
    }

    #[test]
    fn test_run_check_reports_each_dataset() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let train = write_csv(dir.path(), "train.csv", "age,income\n30,100.5\n41,200.0\n")?;
        let good = write_csv(dir.path(), "good.csv", "age,income\n22,90.0\n")?;
        let bad = write_csv(dir.path(), "bad.csv", "age,income\n22,NA\n35,\n")?;

        let spec = spec_for(vec![Selector::AllNumeric]);
        let report = run_check(&spec, &Settings::default(), &train, &[good, bad.clone()])?;

        assert_eq!(report.steps, 1);
        assert!(!report.passed());
        assert_eq!(report.failed(), 1);
        assert!(report.outcomes[0].passed());
        assert_eq!(report.outcomes[1].path, bad);
        assert_eq!(report.outcomes[1].missing_columns, vec!["income"]);
        assert!(report.summary().contains("1 of 2 datasets passed"));
        Ok(())
    }

    #[test]
    fn test_bake_files_keeps_path_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let train = write_csv(dir.path(), "train.csv", "age,income\n30,100.5\n")?;
        let good = write_csv(dir.path(), "good.csv", "age,income\n22,90.0\n")?;
        let bad = write_csv(dir.path(), "bad.csv", "age,income\n22,\n35,\n41,\n")?;
        let absent = dir.path().join("absent.csv");

        let settings = Settings::default();
        let recipe = prep_recipe(&spec_for(vec![Selector::AllNumeric]), &settings, &train)?;
        let paths = [bad.clone(), absent.clone(), good.clone(), bad.clone(), good.clone()];
        let outcomes = bake_files(&recipe, &settings, &paths);

        let order: Vec<&PathBuf> = outcomes.iter().map(|o| &o.path).collect();
        assert_eq!(order, paths.iter().collect::<Vec<_>>());
        let passed: Vec<bool> = outcomes.iter().map(DatasetOutcome::passed).collect();
        assert_eq!(passed, vec![false, false, true, false, true]);
        let rows: Vec<Option<usize>> = outcomes.iter().map(|o| o.rows).collect();
        assert_eq!(rows, vec![Some(3), None, Some(1), Some(3), Some(1)]);
        assert_eq!(outcomes[0].missing_columns, vec!["income"]);
        assert!(outcomes[1].missing_columns.is_empty());
        assert_eq!(outcomes[3].missing_columns, vec!["income"]);
        Ok(())
    }

    #[test]
    fn test_unreadable_dataset_does_not_stop_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let train = write_csv(dir.path(), "train.csv", "age\n30\n")?;
        let good = write_csv(dir.path(), "good.csv", "age\n31\n")?;
        let missing = dir.path().join("absent.csv");

        let spec = spec_for(vec![Selector::name("age")]);
        let report = run_check(&spec, &Settings::default(), &train, &[missing, good])?;

        assert!(!report.outcomes[0].passed());
        assert!(report.outcomes[0].rows.is_none());
        assert!(report.outcomes[1].passed());
        Ok(())
    }

    #[test]
    fn test_invalid_spec_fails_before_baking() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let train = write_csv(dir.path(), "train.csv", "age\n30\n")?;

        let spec = spec_for(vec![Selector::name("salary")]);
        let err = run_check(&spec, &Settings::default(), &train, &[])
            .expect_err("salary is not a column");
        assert!(err.to_string().contains("Recipe validation failed"));
        assert!(err.to_string().contains("Step 1"));
        Ok(())
    }

    #[test]
    fn test_load_trained_requires_prep() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let train = write_csv(dir.path(), "train.csv", "age\n30\n")?;
        let spec = spec_for(vec![Selector::name("age")]);

        assert!(load_trained(&spec).is_err());

        let trained = prep_recipe(&spec, &Settings::default(), &train)?.to_spec();
        let recipe = load_trained(&trained)?;
        assert!(recipe.is_trained());

        let holey = write_csv(dir.path(), "holey.csv", "age\nNA\n")?;
        let report = run_bake(&trained, &Settings::default(), &[train, holey])?;
        assert_eq!(report.failed(), 1);
        assert_eq!(report.outcomes[1].missing_columns, vec!["age"]);
        Ok(())
    }
}
