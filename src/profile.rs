//! # Profile Resolution
//!
//! Determines which named configuration profiles apply to a repository.
//!
//! Two sources contribute profiles:
//!
//! 1. **Name rules**: a table of substring patterns matched against the
//!    lowercase repository name. Matching is non-exclusive, so a name such as
//!    `terraform-k8s-platform` picks up both `terraform` and `kubernetes`.
//! 2. **Declarations**: an optional file listing one profile per line. Blank
//!    lines and lines starting with `#` are ignored.
//!
//! The union of both sources, plus the implicit `base` profile, forms the
//! [`ProfileSet`]. Unknown names are accepted here; they are only discovered
//! to be missing when their fragment is fetched.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// Name of the profile that is always applied first.
pub const BASE_PROFILE: &str = "base";

/// A profile identifier such as `base` or `terraform`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProfileName(String);

impl ProfileName {
    /// Creates a profile name from a token, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// The mandatory base profile.
    pub fn base() -> Self {
        Self(BASE_PROFILE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_PROFILE
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A deduplicated set of profiles that always contains `base`.
///
/// Iteration yields `base` first, then the remaining profiles in
/// lexicographic order. That order is the composition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    extra: BTreeSet<ProfileName>,
}

impl ProfileSet {
    /// Creates a set holding only `base`.
    pub fn new() -> Self {
        Self {
            extra: BTreeSet::new(),
        }
    }

    /// Adds a profile. Inserting `base` or an empty name is a no-op.
    pub fn insert(&mut self, name: ProfileName) {
        if name.is_base() || name.as_str().is_empty() {
            return;
        }
        self.extra.insert(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        name == BASE_PROFILE || self.extra.iter().any(|p| p.as_str() == name)
    }

    /// Number of profiles, including `base`.
    pub fn len(&self) -> usize {
        self.extra.len() + 1
    }

    /// Always `false`: `base` is a permanent member.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates in composition order.
    pub fn iter(&self) -> impl Iterator<Item = ProfileName> + '_ {
        std::iter::once(ProfileName::base()).chain(self.extra.iter().cloned())
    }

    /// Profile names in composition order, as plain strings.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|p| p.to_string()).collect()
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<ProfileName> for ProfileSet {
    fn extend<T: IntoIterator<Item = ProfileName>>(&mut self, iter: T) {
        for name in iter {
            self.insert(name);
        }
    }
}

impl FromIterator<ProfileName> for ProfileSet {
    fn from_iter<T: IntoIterator<Item = ProfileName>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl fmt::Display for ProfileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

/// Maps a repository-name substring to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameRule {
    /// Substring matched against the lowercase repository name.
    pub pattern: String,
    /// Profile contributed when the pattern matches.
    pub profile: String,
}

impl NameRule {
    pub fn new(pattern: &str, profile: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            profile: profile.to_string(),
        }
    }

    fn matches(&self, normalized_name: &str) -> bool {
        !self.pattern.is_empty() && normalized_name.contains(&self.pattern.to_lowercase())
    }
}

/// The built-in rule table.
pub fn default_rules() -> Vec<NameRule> {
    vec![
        NameRule::new("cloudformation", "cloudformation"),
        NameRule::new("cfn", "cloudformation"),
        NameRule::new("terraform", "terraform"),
        NameRule::new("tf-", "terraform"),
        NameRule::new("-tf", "terraform"),
        NameRule::new("ansible", "ansible"),
        NameRule::new("kubernetes", "kubernetes"),
        NameRule::new("k8s", "kubernetes"),
        NameRule::new("helm", "kubernetes"),
    ]
}

/// Returns every profile whose rule matches the repository name.
pub fn infer_from_name(repo_name: &str, rules: &[NameRule]) -> Vec<ProfileName> {
    let normalized = repo_name.to_lowercase();
    rules
        .iter()
        .filter(|rule| rule.matches(&normalized))
        .map(|rule| ProfileName::new(&rule.profile))
        .collect()
}

/// Parses declaration file contents into profile tokens.
pub fn parse_declarations(text: &str) -> Vec<ProfileName> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ProfileName::new)
        .collect()
}

/// Reads a declaration file. A missing file declares nothing.
pub fn read_declarations(path: &Path) -> Result<Vec<ProfileName>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_declarations(&text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No declaration file at {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Resolves the profile set for a repository.
pub fn resolve(repo_name: &str, declared: &[ProfileName], rules: &[NameRule]) -> ProfileSet {
    let inferred = infer_from_name(repo_name, rules);
    debug!(
        "Profiles inferred from name '{}': {:?}, declared: {:?}",
        repo_name, inferred, declared
    );

    let mut set = ProfileSet::new();
    set.extend(inferred);
    set.extend(declared.iter().cloned());
    set
}
