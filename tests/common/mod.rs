//! Shared test utilities for CLI end-to-end tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_standard_upstream();
//!     fixture.apply_command().arg("--repo-name").arg("my-k8s-service")
//!         .assert()
//!         .success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::fragments;
    pub use super::TestFixture;
}

/// Upstream fragment contents used across tests.
#[allow(dead_code)]
pub mod fragments {
    pub const BASE: &str = "---\nrepos:\n  - repo: https://github.com/pre-commit/pre-commit-hooks\n    rev: v4.6.0\n    hooks:\n      - id: trailing-whitespace\n";

    pub const KUBERNETES: &str = "---\n  - repo: https://github.com/stackrox/kube-linter\n    rev: v0.6.8\n    hooks:\n      - id: kube-linter\n";

    pub const TERRAFORM: &str = "---\n  - repo: https://github.com/antonbabenko/pre-commit-terraform\n    rev: v1.96.1\n    hooks:\n      - id: terraform_fmt\n";

    pub const ANSIBLE: &str = "---\n  - repo: https://github.com/ansible/ansible-lint\n    rev: v24.9.2\n    hooks:\n      - id: ansible-lint\n";

    pub const LINT_RULES: &str = "extends: default\nrules:\n  line-length:\n    max: 160\n";
}

/// A temporary workspace holding an upstream profile directory and a
/// repository checkout.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a fixture with empty `upstream/` and `repo/` directories.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("upstream/profiles")
            .create_dir_all()
            .expect("Failed to create upstream directory");
        temp_dir
            .child("repo")
            .create_dir_all()
            .expect("Failed to create repo directory");
        Self { temp_dir }
    }

    /// Publish a profile fragment upstream.
    pub fn with_profile(self, name: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("upstream/profiles/{}.yaml", name))
            .write_str(content)
            .expect("Failed to write profile");
        self
    }

    /// Publish the auxiliary lint-rule configuration upstream.
    pub fn with_lint_rules(self, content: &str) -> Self {
        self.temp_dir
            .child("upstream/yamllint.yaml")
            .write_str(content)
            .expect("Failed to write lint rules");
        self
    }

    /// Publish base, kubernetes, terraform, ansible and the lint rules.
    pub fn with_standard_upstream(self) -> Self {
        self.with_profile("base", fragments::BASE)
            .with_profile("kubernetes", fragments::KUBERNETES)
            .with_profile("terraform", fragments::TERRAFORM)
            .with_profile("ansible", fragments::ANSIBLE)
            .with_lint_rules(fragments::LINT_RULES)
    }

    /// Add a file to the repository checkout.
    pub fn with_repo_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(format!("repo/{}", path))
            .write_str(content)
            .expect("Failed to write repo file");
        self
    }

    pub fn upstream_path(&self) -> PathBuf {
        self.temp_dir.path().join("upstream")
    }

    pub fn repo_path(&self) -> PathBuf {
        self.temp_dir.path().join("repo")
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Read a file from the repository checkout.
    pub fn read_repo_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.repo_path().join(path)).expect("Failed to read repo file")
    }

    /// Create a command running in the repository checkout, isolated from
    /// the caller's environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("lint-profiles");
        cmd.current_dir(self.repo_path())
            .env_remove("LINT_PROFILES_UPSTREAM")
            .env_remove("LINT_PROFILES_SETTINGS")
            .env_remove("LINT_PROFILES_REPO_NAME")
            .env_remove("LINT_PROFILES_LOG")
            .env_remove("GITHUB_OUTPUT")
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env("NO_COLOR", "1");
        cmd
    }

    /// An `apply` command pointed at this fixture's upstream directory.
    pub fn apply_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("apply").arg("--upstream").arg(self.upstream_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
