//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::commands;
use lint_profiles::compose::MergeStrategy;
use lint_profiles::config::{self, Settings};
use lint_profiles::identity::RepositoryIdentity;
use lint_profiles::output::OutputConfig;

/// lint-profiles - Compose pre-commit configuration from upstream profiles
#[derive(Parser, Debug)]
#[command(name = "lint-profiles")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        env = "LINT_PROFILES_LOG"
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose the lint configuration for the current repository
    Apply(commands::apply::ApplyArgs),

    /// Show which profiles apply, without fetching anything
    Resolve(commands::resolve::ResolveArgs),

    /// Decide whether the latest commit should skip linting
    Guard(commands::guard::GuardArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Merge strategy as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Concatenate fragments, dropping the first line of each non-base fragment
    Text,
    /// Merge fragments as YAML documents
    Structural,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Text => MergeStrategy::Text,
            StrategyArg::Structural => MergeStrategy::Structural,
        }
    }
}

/// Options shared by commands that work on a repository checkout.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Repository name (defaults to the origin remote, then the directory name)
    #[arg(long, value_name = "NAME", env = "LINT_PROFILES_REPO_NAME")]
    pub repo_name: Option<String>,

    /// Settings file (defaults to .lint-profiles.yaml in the repository root)
    #[arg(long, value_name = "FILE", env = "LINT_PROFILES_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Profile declaration file, relative to the repository root
    #[arg(long, value_name = "FILE")]
    pub declarations: Option<PathBuf>,
}

impl RepoArgs {
    pub fn repo_dir(&self) -> Result<PathBuf> {
        match &self.repo_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    pub fn load_settings(&self, repo_dir: &Path) -> Result<Settings> {
        let settings = config::load(self.settings.as_deref(), repo_dir)?;
        Ok(settings)
    }

    pub fn identity(&self, repo_dir: &Path) -> Result<RepositoryIdentity> {
        let identity = match &self.repo_name {
            Some(name) => RepositoryIdentity::new(name)?,
            None => RepositoryIdentity::detect(repo_dir)?,
        };
        Ok(identity)
    }

    pub fn declaration_path(&self, repo_dir: &Path, settings: &Settings) -> PathBuf {
        let relative = self
            .declarations
            .clone()
            .unwrap_or_else(|| settings.declaration_file.clone());
        repo_dir.join(relative)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Apply(args) => commands::apply::execute(args, &output),
            Commands::Resolve(args) => commands::resolve::execute(args),
            Commands::Guard(args) => commands::guard::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "error" | "warn" | "info" | "debug" | "trace" | "off" => level.to_lowercase(),
        _ => "warn".to_string(),
    };
    let _ = env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
