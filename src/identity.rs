//! # Repository Identity
//!
//! Profile resolution only needs the repository's name. The resolver takes
//! it as a plain input; this module holds the helpers that derive it from
//! the environment when the caller did not supply one.
//!
//! Sources, in order of preference:
//!
//! 1. An explicit name (e.g. `--repo-name`).
//! 2. The `origin` remote URL of the working directory.
//! 3. The working directory's own name.

use log::debug;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::git;

/// The identity of the repository being configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    name: String,
}

impl RepositoryIdentity {
    /// Creates an identity from a name. An `owner/name` slug is reduced to
    /// its last segment.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref().trim().trim_end_matches('/');
        let name = name.rsplit('/').next().unwrap_or(name).trim();
        if name.is_empty() {
            return Err(Error::Identity {
                message: "repository name is empty".to_string(),
            });
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Derives the identity from a remote URL.
    ///
    /// Handles HTTPS (`https://host/owner/name.git`), scp-like SSH
    /// (`git@host:owner/name.git`) and `ssh://` URLs.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let re = Regex::new(r"(?:^|[/:])(?P<name>[^/:]+?)(?:\.git)?/?$")?;
        let name = re
            .captures(url.trim())
            .and_then(|caps| caps.name("name"))
            .map(|m| m.as_str())
            .ok_or_else(|| Error::Identity {
                message: format!("cannot extract a repository name from '{}'", url),
            })?;
        Self::new(name)
    }

    /// Derives the identity from a directory's name.
    pub fn from_directory(path: &Path) -> Result<Self> {
        let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Identity {
                message: format!("'{}' has no directory name", path.display()),
            })?;
        Self::new(name)
    }

    /// Derives the identity of the repository checked out at `repo_dir`:
    /// from its `origin` remote when there is one, otherwise from the
    /// directory name.
    pub fn detect(repo_dir: &Path) -> Result<Self> {
        match git::remote_url(repo_dir) {
            Ok(Some(url)) => {
                debug!("Deriving repository name from remote '{}'", url);
                return Self::from_remote_url(&url);
            }
            Ok(None) => debug!("No origin remote in {}", repo_dir.display()),
            Err(e) => debug!("Could not query git remote: {}", e),
        }
        Self::from_directory(repo_dir)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
