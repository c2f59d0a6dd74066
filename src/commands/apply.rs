//! Apply command implementation
//!
//! Resolves the repository's profiles, composes the fragments into the
//! pre-commit configuration, writes it, and refreshes the auxiliary
//! lint-rule configuration. Prints one summary line naming the applied
//! profiles.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{RepoArgs, StrategyArg};
use lint_profiles::apply::{apply, ApplyRequest, AuxiliaryOutcome, AuxiliaryResource};
use lint_profiles::output::{emoji, status_line, OutputConfig, Status};
use lint_profiles::source::open_source;

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Upstream profile location (https:// URL, file:// URL or directory)
    #[arg(short, long, value_name = "URL", env = "LINT_PROFILES_UPSTREAM")]
    pub upstream: Option<String>,

    /// Output path for the composed configuration, relative to the repository root
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output path for the lint-rule configuration, relative to the repository root
    #[arg(long, value_name = "PATH")]
    pub lint_rules_output: Option<PathBuf>,

    /// Do not fetch the lint-rule configuration
    #[arg(long)]
    pub no_lint_rules: bool,

    /// How to combine fragments
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries for transient network failures
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the apply command
pub fn execute(args: ApplyArgs, output: &OutputConfig) -> Result<()> {
    let repo_dir = args.repo.repo_dir()?;
    let mut settings = args.repo.load_settings(&repo_dir)?;

    if let Some(upstream) = args.upstream {
        settings.upstream = Some(upstream);
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            anyhow::bail!("--timeout must be greater than zero");
        }
        settings.timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        settings.retries = retries;
    }
    if let Some(strategy) = args.strategy {
        settings.strategy = strategy.into();
    }

    let source = open_source(
        settings.require_upstream()?,
        Duration::from_secs(settings.timeout_secs),
        settings.retries,
    )?;

    let identity = args.repo.identity(&repo_dir)?;
    let lint_rules = (settings.lint_rules.enabled && !args.no_lint_rules).then(|| {
        AuxiliaryResource {
            resource: settings.lint_rules.resource.clone(),
            output: repo_dir.join(
                args.lint_rules_output
                    .clone()
                    .unwrap_or_else(|| settings.lint_rules.output.clone()),
            ),
        }
    });

    let request = ApplyRequest {
        identity,
        declaration_path: args.repo.declaration_path(&repo_dir, &settings),
        output_path: repo_dir.join(args.output.unwrap_or_else(|| settings.output.clone())),
        lint_rules,
        strategy: settings.strategy,
    };

    let report = match apply(&request, &settings.name_rules(), source.as_ref()) {
        Ok(report) => report,
        Err(e) => {
            if !args.quiet {
                eprintln!("{}", status_line(output, Status::Failure, "Apply failed"));
            }
            return Err(e.into());
        }
    };

    if !args.quiet {
        println!(
            "{}",
            status_line(output, Status::Success, &report.summary_line())
        );

        for skipped in report.composed.skipped() {
            eprintln!(
                "{} {} ({})",
                emoji(output, "⏭️ ", "skipped:"),
                skipped.profile,
                skipped.reason
            );
        }
        if let AuxiliaryOutcome::Failed(reason) = &report.lint_rules {
            eprintln!(
                "{}",
                status_line(
                    output,
                    Status::Warning,
                    &format!("Lint rules not updated: {}", reason)
                )
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(repo_dir: &std::path::Path, upstream: &std::path::Path) -> ApplyArgs {
        ApplyArgs {
            repo: RepoArgs {
                repo_dir: Some(repo_dir.to_path_buf()),
                repo_name: Some("my-k8s-service".to_string()),
                settings: None,
                declarations: None,
            },
            upstream: Some(upstream.display().to_string()),
            output: None,
            lint_rules_output: None,
            no_lint_rules: false,
            strategy: None,
            timeout: None,
            retries: Some(0),
            quiet: true,
        }
    }

    fn upstream_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("profiles")).unwrap();
        fs::write(
            temp.path().join("profiles/base.yaml"),
            "---\nrepos:\n  - repo: local\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("profiles/kubernetes.yaml"),
            "---\n  - repo: kube-linter\n",
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_execute_writes_composed_output() {
        let upstream = upstream_dir();
        let repo = TempDir::new().unwrap();

        execute(args(repo.path(), upstream.path()), &OutputConfig::without_color()).unwrap();

        let written = fs::read_to_string(repo.path().join(".pre-commit-config.yaml")).unwrap();
        assert_eq!(written, "---\nrepos:\n  - repo: local\n  - repo: kube-linter\n");
    }

    #[test]
    fn test_execute_custom_output_path() {
        let upstream = upstream_dir();
        let repo = TempDir::new().unwrap();
        let mut args = args(repo.path(), upstream.path());
        args.output = Some(PathBuf::from("ci/pre-commit.yaml"));
        args.no_lint_rules = true;

        execute(args, &OutputConfig::without_color()).unwrap();
        assert!(repo.path().join("ci/pre-commit.yaml").exists());
        assert!(!repo.path().join(".yamllint.yaml").exists());
    }

    #[test]
    fn test_execute_without_upstream_fails() {
        let repo = TempDir::new().unwrap();
        let mut args = args(repo.path(), repo.path());
        args.upstream = None;
        args.repo.settings = Some(repo.path().join("empty.yaml"));
        fs::write(repo.path().join("empty.yaml"), "").unwrap();

        let err = execute(args, &OutputConfig::without_color()).unwrap_err();
        assert!(err.to_string().contains("no upstream"));
    }

    #[test]
    fn test_execute_zero_timeout_rejected() {
        let upstream = upstream_dir();
        let repo = TempDir::new().unwrap();
        let mut args = args(repo.path(), upstream.path());
        args.timeout = Some(0);

        assert!(execute(args, &OutputConfig::without_color()).is_err());
    }
}
