//! # Apply
//!
//! The end-to-end operation behind `lint-profiles apply`:
//!
//! 1. **Resolve**: read the declaration file and combine it with the name
//!    rules into a [`ProfileSet`].
//! 2. **Compose**: fetch and join the fragments. A missing `base` aborts here,
//!    before anything touches the disk.
//! 3. **Write**: atomically replace the composed output file.
//! 4. **Lint rules**: fetch the auxiliary lint-rule configuration and write
//!    it to its own path. This step is best-effort; its failure is reported
//!    but never undoes step 3.

use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::compose::{ComposedConfig, Composer, MergeStrategy};
use crate::error::Result;
use crate::filesystem;
use crate::identity::RepositoryIdentity;
use crate::profile::{self, NameRule, ProfileSet};
use crate::source::FragmentSource;

/// Auxiliary resource to fetch alongside the composed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryResource {
    /// Upstream resource key.
    pub resource: String,
    /// Destination path.
    pub output: PathBuf,
}

/// Inputs for [`apply`].
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub identity: RepositoryIdentity,
    pub declaration_path: PathBuf,
    pub output_path: PathBuf,
    pub lint_rules: Option<AuxiliaryResource>,
    pub strategy: MergeStrategy,
}

/// What happened to the auxiliary resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxiliaryOutcome {
    Disabled,
    Written(PathBuf),
    Failed(String),
}

/// Result of a successful [`apply`].
#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub profiles: ProfileSet,
    pub composed: ComposedConfig,
    pub output_path: PathBuf,
    pub lint_rules: AuxiliaryOutcome,
}

impl ApplyReport {
    /// The one-line console summary naming the applied profiles.
    pub fn summary_line(&self) -> String {
        format!("Applied profiles: {}", self.composed.summary())
    }
}

/// Resolves the profile set for a request without fetching anything.
pub fn resolve_profiles(
    identity: &RepositoryIdentity,
    declaration_path: &Path,
    rules: &[NameRule],
) -> Result<ProfileSet> {
    let declared = profile::read_declarations(declaration_path)?;
    Ok(profile::resolve(identity.name(), &declared, rules))
}

/// Runs the full resolve, compose and write operation.
///
/// # Errors
///
/// Fails when the declaration file cannot be read, when the `base` fragment
/// is unavailable, or when the composed output cannot be written. In the
/// first two cases no file has been touched.
pub fn apply(
    request: &ApplyRequest,
    rules: &[NameRule],
    source: &dyn FragmentSource,
) -> Result<ApplyReport> {
    let profiles = resolve_profiles(&request.identity, &request.declaration_path, rules)?;
    info!(
        "Resolved profiles for '{}': {}",
        request.identity, profiles
    );

    let composed = Composer::new(source)
        .with_strategy(request.strategy)
        .compose(&profiles)?;

    filesystem::write_text(&request.output_path, composed.text())?;
    info!("Wrote {}", request.output_path.display());

    let lint_rules = match &request.lint_rules {
        None => AuxiliaryOutcome::Disabled,
        Some(aux) => fetch_auxiliary(aux, source),
    };

    Ok(ApplyReport {
        profiles,
        composed,
        output_path: request.output_path.clone(),
        lint_rules,
    })
}

fn fetch_auxiliary(aux: &AuxiliaryResource, source: &dyn FragmentSource) -> AuxiliaryOutcome {
    let result = source
        .fetch(&aux.resource)
        .and_then(|content| filesystem::write_text(&aux.output, &content));

    match result {
        Ok(()) => {
            info!("Wrote {}", aux.output.display());
            AuxiliaryOutcome::Written(aux.output.clone())
        }
        Err(e) => {
            warn!(
                "Could not update {} from {}: {}",
                aux.output.display(),
                source.describe(&aux.resource),
                e
            );
            AuxiliaryOutcome::Failed(e.to_string())
        }
    }
}
