//! Thin wrappers around the system `git` command.
//!
//! Using the `git` binary means whatever configuration the CI runner or the
//! developer already has (safe directories, credential helpers, worktrees)
//! applies unchanged.

use std::path::Path;
use std::process::Command;

use crate::error::Error;
use crate::guard::CommitInfo;

/// Field separator used in `git log` format strings. The unit separator never
/// appears in names or emails.
const FIELD_SEP: char = '\u{1f}';

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<std::process::Output, Error> {
    Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: format!("git {}", args.join(" ")),
            stderr: e.to_string(),
        })
}

/// Returns the URL of the `origin` remote, or `None` when the directory has
/// no such remote or is not a git repository.
pub fn remote_url(repo_dir: &Path) -> Result<Option<String>, Error> {
    let output = run_git(repo_dir, &["remote", "get-url", "origin"])?;
    if !output.status.success() {
        return Ok(None);
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!url.is_empty()).then_some(url))
}

/// Reads author and message of the latest commit (`HEAD`).
pub fn latest_commit(repo_dir: &Path) -> Result<CommitInfo, Error> {
    let format = format!("--format=%an{sep}%ae{sep}%B", sep = FIELD_SEP);
    let args = ["log", "-1", format.as_str()];
    let output = run_git(repo_dir, &args)?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: "git log -1".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_log_record(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| Error::GitCommand {
        command: "git log -1".to_string(),
        stderr: "unexpected output format".to_string(),
    })
}

/// Parses a `%an<US>%ae<US>%B` record.
fn parse_log_record(record: &str) -> Option<CommitInfo> {
    let mut fields = record.splitn(3, FIELD_SEP);
    let author_name = fields.next()?.trim().to_string();
    let author_email = fields.next()?.trim().to_string();
    let message = fields.next()?.trim_end().to_string();
    Some(CommitInfo {
        author_name,
        author_email,
        message,
    })
}
