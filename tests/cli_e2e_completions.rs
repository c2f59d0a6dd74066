//! End-to-end tests for the `lint-profiles completions` command.

mod common;
use common::prelude::*;

#[test]
fn test_completions_help() {
    cargo_bin_cmd!("lint-profiles")
        .arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"));
}

#[test]
fn test_completions_bash() {
    cargo_bin_cmd!("lint-profiles")
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_lint__profiles()"))
        .stdout(predicate::str::contains("complete -F _lint__profiles"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("guard"));
}

#[test]
fn test_completions_zsh() {
    cargo_bin_cmd!("lint-profiles")
        .arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef lint-profiles"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn test_completions_invalid_shell() {
    cargo_bin_cmd!("lint-profiles")
        .arg("completions")
        .arg("tcsh")
        .assert()
        .failure();
}
