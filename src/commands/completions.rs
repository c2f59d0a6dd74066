//! Completions command implementation
//!
//! Writes a shell completion script for `lint-profiles` to stdout.
//!
//! ```bash
//! lint-profiles completions bash > ~/.local/share/bash-completion/completions/lint-profiles
//! lint-profiles completions zsh > ~/.zfunc/_lint-profiles
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Arguments for the completions command
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
