//! # Bot-Commit Loop Guard
//!
//! CI pipelines that auto-fix lint findings push a commit, which triggers the
//! pipeline again. To break the loop, the latest commit is classified as
//! automation-authored or human-authored before each run. On automation
//! commits the lint step is skipped; the security scan always runs.
//!
//! Detection is a pluggable predicate ([`AutomationDetector`]). The default,
//! [`BotIdentityDetector`], fires on either of two independent signals:
//!
//! - the author name or email equals the bot identity;
//! - the commit message contains the skip marker.
//!
//! The classification is recomputed on every run from the latest commit
//! alone. Nothing is persisted.

use serde::Deserialize;

/// Author identity used by the default detector.
pub const DEFAULT_BOT_IDENTITY: &str = "github-actions[bot]";

/// Commit-message marker used by the default detector.
pub const DEFAULT_SKIP_MARKER: &str = "[skip lint]";

/// The parts of a commit the guard looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub author_name: String,
    pub author_email: String,
    pub message: String,
}

/// Decides whether a commit was produced by automation.
pub trait AutomationDetector {
    fn is_automation_commit(&self, commit: &CommitInfo) -> bool;
}

impl<F> AutomationDetector for F
where
    F: Fn(&CommitInfo) -> bool,
{
    fn is_automation_commit(&self, commit: &CommitInfo) -> bool {
        self(commit)
    }
}

/// Matches a bot identity or a skip marker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotIdentityDetector {
    /// Compared for exact equality with the author name and email.
    pub bot_identity: String,
    /// Searched for as a substring of the commit message.
    pub skip_marker: String,
}

impl BotIdentityDetector {
    pub fn new(bot_identity: impl Into<String>, skip_marker: impl Into<String>) -> Self {
        Self {
            bot_identity: bot_identity.into(),
            skip_marker: skip_marker.into(),
        }
    }
}

impl Default for BotIdentityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BOT_IDENTITY, DEFAULT_SKIP_MARKER)
    }
}

impl AutomationDetector for BotIdentityDetector {
    fn is_automation_commit(&self, commit: &CommitInfo) -> bool {
        let by_author = !self.bot_identity.is_empty()
            && (commit.author_name == self.bot_identity
                || commit.author_email == self.bot_identity);
        let by_marker = !self.skip_marker.is_empty() && commit.message.contains(&self.skip_marker);
        by_author || by_marker
    }
}

/// What the pipeline should run for the current commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardDecision {
    pub automation: bool,
    pub run_lint: bool,
    pub run_security_scan: bool,
}

impl GuardDecision {
    pub fn evaluate(detector: &dyn AutomationDetector, commit: &CommitInfo) -> Self {
        let automation = detector.is_automation_commit(commit);
        Self {
            automation,
            run_lint: !automation,
            run_security_scan: true,
        }
    }

    /// `key=value` lines in the format CI step-output files expect.
    pub fn to_output_lines(&self) -> Vec<String> {
        vec![
            format!("automation={}", self.automation),
            format!("skip_lint={}", !self.run_lint),
            format!("run_security_scan={}", self.run_security_scan),
        ]
    }
}
