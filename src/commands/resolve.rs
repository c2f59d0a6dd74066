//! Resolve command implementation
//!
//! Prints the profile set that `apply` would compose for the repository,
//! without contacting the upstream source. Useful for checking a
//! declaration file or a repository name against the rule table.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::RepoArgs;
use lint_profiles::apply::resolve_profiles;
use lint_profiles::profile::ProfileName;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Print JSON instead of one profile per line
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    repository: &'a str,
    profiles: Vec<ProfileName>,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs) -> Result<()> {
    let repo_dir = args.repo.repo_dir()?;
    let settings = args.repo.load_settings(&repo_dir)?;
    let identity = args.repo.identity(&repo_dir)?;
    let declaration_path = args.repo.declaration_path(&repo_dir, &settings);

    let profiles = resolve_profiles(&identity, &declaration_path, &settings.name_rules())?;

    if args.json {
        let out = ResolveOutput {
            repository: identity.name(),
            profiles: profiles.iter().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for name in profiles.names() {
            println!("{}", name);
        }
    }

    Ok(())
}
