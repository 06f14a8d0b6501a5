//! # salesclean entry point
//!
//! ```bash
//! salesclean                                  # default paths, impute policy
//! salesclean clean --policy drop --strict
//! salesclean clean -i raw.csv -o out/clean_{date}.csv
//! salesclean config > spec.json               # editable default spec
//! salesclean clean --config spec.json
//! ```
//!
//! Exits non-zero with a diagnostic on stderr if the input is missing or
//! malformed, or (with `--strict`) a required column is absent.

#![warn(clippy::all, rust_2018_idioms)]

mod cli;

use anyhow::Result;
use clap::Parser as _;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    salesclean::logging::init(cli.verbose, cli.log_dir.as_deref())?;
    cli::run(cli)
}
