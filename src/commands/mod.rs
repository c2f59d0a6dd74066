//! # CLI Command Implementations
//!
//! Each subcommand of `lint-profiles` lives in its own module with:
//! - an `Args` struct holding its `clap` arguments;
//! - an `execute` function that runs the command on top of the
//!   `lint_profiles` library.

pub mod apply;
pub mod completions;
pub mod guard;
pub mod resolve;
