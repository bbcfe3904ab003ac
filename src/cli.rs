use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use recipe_checks::config::Settings;
use recipe_checks::pipeline::{self, RecipeSpec, RunReport};
use recipe_checks::recipe::Recipe;
use recipe_checks::schema::SchemaInfo;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "recipe-checks",
    version,
    about = "Train data-quality recipes and check datasets against them"
)]
pub struct Cli {
    /// Path to a JSON settings file
    #[arg(long, global = true, env = "RECIPE_CHECKS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a recipe on a training file, then check each data file
    Check {
        /// Recipe spec (JSON)
        #[arg(short, long)]
        recipe: PathBuf,

        /// Training data (CSV, Parquet, JSON)
        #[arg(short, long)]
        train: PathBuf,

        /// Datasets to check. Defaults to the training file itself.
        data: Vec<PathBuf>,
    },
    /// Train a recipe and write the trained spec
    Prep {
        /// Recipe spec (JSON)
        #[arg(short, long)]
        recipe: PathBuf,

        /// Training data (CSV, Parquet, JSON)
        #[arg(short, long)]
        train: PathBuf,

        /// Where to write the trained recipe spec
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Check data files with an already trained recipe spec
    Bake {
        /// Trained recipe spec (JSON), as written by `prep`
        #[arg(short, long)]
        recipe: PathBuf,

        /// Datasets to check
        #[arg(required = true)]
        data: Vec<PathBuf>,
    },
    /// Print a recipe and its step summary
    Describe {
        /// Recipe spec (JSON)
        #[arg(short, long)]
        recipe: PathBuf,

        /// Train the recipe on this file before printing
        #[arg(short, long)]
        train: Option<PathBuf>,
    },
}

pub fn run_command(command: Commands, settings: &Settings) -> Result<ExitCode> {
    match command {
        Commands::Check {
            recipe,
            train,
            data,
        } => {
            let spec = RecipeSpec::from_file(&recipe)?;
            let data = if data.is_empty() {
                vec![train.clone()]
            } else {
                data
            };
            let report = pipeline::run_check(&spec, settings, &train, &data)?;
            Ok(finish(&report))
        }
        Commands::Prep {
            recipe,
            train,
            output,
        } => {
            let spec = RecipeSpec::from_file(&recipe)?;
            let trained = pipeline::prep_recipe(&spec, settings, &train)?;
            trained.to_spec().to_file(&output)?;
            println!("{trained}");
            println!();
            println!("Trained recipe written to {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Bake { recipe, data } => {
            let spec = RecipeSpec::from_file(&recipe)?;
            let report = pipeline::run_bake(&spec, settings, &data)?;
            Ok(finish(&report))
        }
        Commands::Describe { recipe, train } => {
            let spec = RecipeSpec::from_file(&recipe)?;
            let recipe: Recipe = match train {
                Some(train) => pipeline::prep_recipe(&spec, settings, &train)?,
                None => spec.build(SchemaInfo::default())?,
            };
            describe(&recipe)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn finish(report: &RunReport) -> ExitCode {
    println!("{}", report.summary());
    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn describe(recipe: &Recipe) -> Result<()> {
    println!("{recipe}");
    println!();
    println!("{}", recipe.tidy().context("Failed to summarize recipe")?);
    for number in 1..=recipe.len() {
        let tidy = recipe
            .tidy_step(number)
            .with_context(|| format!("Failed to summarize step {number}"))?;
        println!();
        println!("Step {number}:");
        println!("{tidy}");
    }
    Ok(())
}
