//! # Fragment Composition
//!
//! Fetches one fragment per profile and joins them into a single
//! configuration document.
//!
//! ## Ordering and failure handling
//!
//! Fragments are fetched sequentially in [`ProfileSet`] order: `base` first,
//! then the remaining profiles lexicographically. The `base` fragment is
//! mandatory; if it cannot be fetched the whole composition fails with
//! [`Error::BaseUnavailable`]. Any other fragment that cannot be fetched is
//! recorded as skipped and composition continues.
//!
//! ## Strategies
//!
//! - **Text** (default): `base` is emitted verbatim; every later fragment is
//!   emitted without its first line, which conventionally holds the `---`
//!   document-start marker. The result is one document rather than a stream
//!   of documents.
//! - **Structural**: fragments are parsed as YAML and merged entry by entry
//!   (see [`crate::merge::yaml`]). This does not depend on the first-line
//!   convention. A fragment whose root is a bare list extends `repos:`; a
//!   fragment that cannot be merged is skipped, not applied.

use log::{debug, info, warn};
use serde::Deserialize;
use std::fmt;

use crate::error::{Error, Result};
use crate::merge::yaml::{merge_fragment, parse_document, render_document};
use crate::profile::{ProfileName, ProfileSet};
use crate::source::{profile_resource_key, FragmentSource};

/// How fragments are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Concatenate text, stripping the first line of every non-base fragment.
    #[default]
    Text,
    /// Parse each fragment as YAML and merge the trees.
    Structural,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Text => f.write_str("text"),
            MergeStrategy::Structural => f.write_str("structural"),
        }
    }
}

/// A profile left out of the composed output, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProfile {
    pub profile: ProfileName,
    pub reason: String,
}

/// The result of composing a profile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedConfig {
    text: String,
    applied: Vec<ProfileName>,
    skipped: Vec<SkippedProfile>,
}

impl ComposedConfig {
    /// The composed document.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Profiles whose fragments made it into the output, in output order.
    pub fn applied(&self) -> &[ProfileName] {
        &self.applied
    }

    /// Profiles that were requested but could not be fetched or used.
    pub fn skipped(&self) -> &[SkippedProfile] {
        &self.skipped
    }

    /// Comma-separated list of applied profiles.
    pub fn summary(&self) -> String {
        self.applied
            .iter()
            .map(ProfileName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Composes profile fragments fetched from a [`FragmentSource`].
pub struct Composer<'a> {
    source: &'a dyn FragmentSource,
    strategy: MergeStrategy,
}

impl<'a> Composer<'a> {
    pub fn new(source: &'a dyn FragmentSource) -> Self {
        Self {
            source,
            strategy: MergeStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Fetches and combines the fragments of every profile in `profiles`.
    ///
    /// # Errors
    ///
    /// Returns `Error::BaseUnavailable` when the `base` fragment cannot be
    /// fetched (or, with the structural strategy, parsed). Failures of other
    /// profiles are never returned; they show up in
    /// [`ComposedConfig::skipped`].
    pub fn compose(&self, profiles: &ProfileSet) -> Result<ComposedConfig> {
        let base = ProfileName::base();
        let base_text = self
            .fetch_profile(&base)
            .map_err(|e| Error::BaseUnavailable {
                message: e.to_string(),
            })?;
        debug!("Fetched base fragment ({} bytes)", base_text.len());

        let mut fragments = Vec::new();
        let mut skipped = Vec::new();
        for profile in profiles.iter().filter(|p| !p.is_base()) {
            match self.fetch_profile(&profile) {
                Ok(text) => {
                    debug!("Fetched {} fragment ({} bytes)", profile, text.len());
                    fragments.push((profile, text));
                }
                Err(e) => {
                    warn!("Skipping profile '{}': {}", profile, e);
                    skipped.push(SkippedProfile {
                        profile,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let composed = match self.strategy {
            MergeStrategy::Text => compose_text(&base_text, fragments),
            MergeStrategy::Structural => compose_structural(&base_text, fragments)?,
        };

        let mut applied = vec![base];
        applied.extend(composed.applied);
        skipped.extend(composed.rejected);

        let config = ComposedConfig {
            text: composed.text,
            applied,
            skipped,
        };
        info!("Composed profiles: {}", config.summary());
        Ok(config)
    }

    fn fetch_profile(&self, profile: &ProfileName) -> Result<String> {
        let key = profile_resource_key(profile)?;
        debug!("Fetching {}", self.source.describe(&key));
        self.source.fetch(&key)
    }
}

struct Composition {
    text: String,
    applied: Vec<ProfileName>,
    rejected: Vec<SkippedProfile>,
}

/// Removes everything up to and including the first line break.
pub fn strip_first_line(fragment: &str) -> &str {
    match fragment.find('\n') {
        Some(idx) => &fragment[idx + 1..],
        None => "",
    }
}

fn compose_text(base: &str, fragments: Vec<(ProfileName, String)>) -> Composition {
    let mut text = base.to_string();
    let mut applied = Vec::with_capacity(fragments.len());

    for (profile, fragment) in fragments {
        let body = strip_first_line(&fragment);
        if !body.is_empty() && !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(body);
        applied.push(profile);
    }

    Composition {
        text,
        applied,
        rejected: Vec::new(),
    }
}

fn compose_structural(base: &str, fragments: Vec<(ProfileName, String)>) -> Result<Composition> {
    let mut document = parse_document(base, "base").map_err(|e| Error::BaseUnavailable {
        message: e.to_string(),
    })?;
    let mut applied = Vec::with_capacity(fragments.len());
    let mut rejected = Vec::new();

    for (profile, fragment) in fragments {
        let merged = parse_document(&fragment, profile.as_str())
            .and_then(|value| merge_fragment(&mut document, &value, profile.as_str()));
        match merged {
            Ok(()) => applied.push(profile),
            Err(e) => {
                warn!("Skipping profile '{}': {}", profile, e);
                rejected.push(SkippedProfile {
                    profile,
                    reason: e.to_string(),
                });
            }
        }
    }

    let with_marker = base.trim_start().starts_with("---");
    Ok(Composition {
        text: render_document(&document, with_marker)?,
        applied,
        rejected,
    })
}
