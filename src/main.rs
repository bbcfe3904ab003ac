//! # recipe-checks command-line entry point
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap)
//!   ├─> Load settings (--config, RECIPE_CHECKS_LOG)
//!   ├─> Initialize logging
//!   └─> Execute subcommand
//! ```
//!
//! ```bash
//! recipe-checks check --recipe loans.recipe.json --train train.csv march.csv april.csv
//! recipe-checks prep --recipe loans.recipe.json --train train.csv --output loans.trained.json
//! recipe-checks bake --recipe loans.trained.json may.csv
//! recipe-checks describe --recipe loans.trained.json
//! ```
//!
//! Exits non-zero when any dataset fails its checks or a command errors.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use anyhow::Result;
use clap::Parser as _;
use recipe_checks::config::Settings;
use recipe_checks::logging;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    logging::init(&settings.log_level)?;

    cli::run_command(cli.command, &settings)
}
