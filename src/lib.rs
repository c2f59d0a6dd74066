//! # lint-profiles
//!
//! Composes a repository's pre-commit lint configuration from named profiles
//! hosted upstream. It is the library behind the `lint-profiles` command-line
//! tool, and can be embedded wherever the same composition is needed.
//!
//! ## Quick Example
//!
//! ```
//! use lint_profiles::compose::Composer;
//! use lint_profiles::profile::{default_rules, resolve};
//! use lint_profiles::source::MemorySource;
//!
//! let upstream = MemorySource::new()
//!     .with_profile("base", "---\nrepos:\n  - repo: local\n")
//!     .with_profile("kubernetes", "---\n  - repo: kube-linter\n");
//!
//! let profiles = resolve("my-k8s-service", &[], &default_rules());
//! assert_eq!(profiles.names(), vec!["base", "kubernetes"]);
//!
//! let composed = Composer::new(&upstream).compose(&profiles).unwrap();
//! assert_eq!(
//!     composed.text(),
//!     "---\nrepos:\n  - repo: local\n  - repo: kube-linter\n"
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Profiles (`profile`)**: named configuration fragments. The set that
//!   applies is resolved from the repository name and an optional
//!   declaration file; `base` is always included and always first.
//! - **Sources (`source`)**: where fragments come from (HTTP, a local
//!   directory, memory), with retry on transient failures.
//! - **Composition (`compose`, `merge`)**: joins the fragments into one
//!   document, either as text or structurally.
//! - **Apply (`apply`)**: resolve, compose, write the output and fetch the
//!   auxiliary lint-rule configuration.
//! - **Guard (`guard`)**: classifies the latest commit as automation or human
//!   authored, so CI can skip linting on its own auto-fix commits.
//!
//! ## Failure Model
//!
//! A missing `base` profile is fatal and leaves the disk untouched. Every
//! other missing piece (optional profiles, the lint-rule file) is skipped
//! with a warning.

pub mod apply;
pub mod compose;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod guard;
pub mod identity;
pub mod merge;
pub mod output;
pub mod profile;
pub mod source;

#[cfg(test)]
mod profile_proptest;
