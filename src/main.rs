//! # lint-profiles CLI
//!
//! Binary entry point for the `lint-profiles` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and console output.
//! - Dispatching to the selected command.
//!
//! The core logic lives in the `lint_profiles` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
