//! Guard command implementation
//!
//! Classifies the latest commit as automation-authored or human-authored
//! and reports which pipeline steps should run. The decision is printed as
//! `key=value` lines and, with `--github-output`, appended to the CI
//! step-output file. The exit code is 0 either way; callers branch on the
//! printed values.

use anyhow::{Context, Result};
use clap::Args;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use lint_profiles::config;
use lint_profiles::git;
use lint_profiles::guard::{BotIdentityDetector, GuardDecision};
use lint_profiles::output::{status_line, OutputConfig, Status};

/// Arguments for the guard command
#[derive(Args, Debug)]
pub struct GuardArgs {
    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    pub repo_dir: Option<PathBuf>,

    /// Settings file (defaults to .lint-profiles.yaml in the repository root)
    #[arg(long, value_name = "FILE", env = "LINT_PROFILES_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Author name or email that identifies the auto-fix bot
    #[arg(long, value_name = "IDENTITY")]
    pub bot_identity: Option<String>,

    /// Commit-message marker that requests skipping the lint step
    #[arg(long, value_name = "MARKER")]
    pub skip_marker: Option<String>,

    /// Append the decision to this file (e.g. $GITHUB_OUTPUT)
    #[arg(long, value_name = "FILE", env = "GITHUB_OUTPUT")]
    pub github_output: Option<PathBuf>,
}

/// Execute the guard command
pub fn execute(args: GuardArgs, output: &OutputConfig) -> Result<()> {
    let repo_dir = match args.repo_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let settings = config::load(args.settings.as_deref(), &repo_dir)?;

    let mut detector: BotIdentityDetector = settings.guard;
    if let Some(identity) = args.bot_identity {
        detector.bot_identity = identity;
    }
    if let Some(marker) = args.skip_marker {
        detector.skip_marker = marker;
    }

    let commit = git::latest_commit(&repo_dir)?;
    let decision = GuardDecision::evaluate(&detector, &commit);

    let lines = decision.to_output_lines();
    for line in &lines {
        println!("{}", line);
    }

    if let Some(path) = &args.github_output {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        for line in &lines {
            writeln!(file, "{}", line)?;
        }
    }

    let message = if decision.automation {
        format!(
            "Latest commit by '{}' is automation-authored: lint skipped, security scan runs",
            commit.author_name
        )
    } else {
        "Latest commit is human-authored: lint and security scan run".to_string()
    };
    let status = if decision.automation {
        Status::Warning
    } else {
        Status::Success
    };
    eprintln!("{}", status_line(output, status, &message));

    Ok(())
}
