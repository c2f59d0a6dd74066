//! # Error Handling
//!
//! This module defines the centralized error type for the `lint-profiles`
//! library. It uses `thiserror` to describe every anticipated failure mode
//! with a readable message.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum representing all errors the library can
//!   produce. Variants carry the context needed to diagnose the failure
//!   (resource keys, URLs, git commands).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! ## Fatal vs. tolerated failures
//!
//! Fetch failures come in three flavours: `NotFound`, `Network` and
//! `Timeout`. Whether one of them aborts an operation is decided by the
//! caller, not the error: a missing `base` profile is wrapped into
//! `BaseUnavailable`, while a missing optional profile is merely recorded as
//! skipped. `Error::is_transient` identifies the failures worth retrying.

use thiserror::Error;

/// Main error type for lint-profiles operations
#[derive(Error, Debug)]
pub enum Error {
    /// The settings file could not be parsed or holds an invalid value.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The mandatory `base` profile could not be fetched or used. Nothing is
    /// written when this happens.
    #[error("Cannot bootstrap: base profile unavailable: {message}")]
    BaseUnavailable { message: String },

    /// The upstream source has no resource under the requested key.
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// A transport-level failure while talking to the upstream source.
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// The upstream source did not answer within the configured timeout.
    #[error("Request timed out after {seconds}s: {url}")]
    Timeout { url: String, seconds: u64 },

    /// A profile token that cannot be turned into an upstream resource key.
    #[error("Invalid profile name: '{name}'")]
    InvalidProfile { name: String },

    /// An error occurred while executing a git command.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// The repository identity could not be determined.
    #[error("Cannot determine repository identity: {message}")]
    Identity { message: String },

    /// An error occurred while merging fragments structurally.
    #[error("Merge operation error: {operation} - {message}")]
    Merge { operation: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Returns `true` for failures that may succeed on a later attempt.
    ///
    /// Only transport errors and timeouts qualify. A missing resource stays
    /// missing, so `NotFound` is never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::Timeout { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid upstream".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("Invalid upstream"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "No upstream configured".to_string(),
            hint: Some("Pass --upstream or set LINT_PROFILES_UPSTREAM".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("No upstream configured"));
        assert!(display.contains("hint:"));
        assert!(display.contains("LINT_PROFILES_UPSTREAM"));
    }

    #[test]
    fn test_error_display_base_unavailable() {
        let error = Error::BaseUnavailable {
            message: "Resource not found: profiles/base.yaml".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Cannot bootstrap"));
        assert!(display.contains("profiles/base.yaml"));
    }

    #[test]
    fn test_error_display_timeout() {
        let error = Error::Timeout {
            url: "https://example.com/profiles/base.yaml".to_string(),
            seconds: 30,
        };
        let display = format!("{}", error);
        assert!(display.contains("timed out after 30s"));
        assert!(display.contains("https://example.com/profiles/base.yaml"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "git log -1".to_string(),
            stderr: "not a git repository".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("git log -1"));
        assert!(display.contains("not a git repository"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network {
            url: "https://example.com".to_string(),
            message: "connection reset".to_string(),
        }
        .is_transient());
        assert!(Error::Timeout {
            url: "https://example.com".to_string(),
            seconds: 5,
        }
        .is_transient());
        assert!(!Error::NotFound {
            resource: "profiles/ansible.yaml".to_string(),
        }
        .is_transient());
        assert!(!Error::InvalidProfile {
            name: "../etc".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}
