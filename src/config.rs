//! # Settings
//!
//! Tool settings for `lint-profiles`: where the upstream profiles live,
//! which fixed paths are read and written, the name-rule table and network
//! behaviour. Settings come from an optional YAML file; every field has a
//! default, so an empty or missing file is valid.
//!
//! ```yaml
//! upstream: https://config.example.com/lint
//! declaration_file: .lint-profiles
//! output: .pre-commit-config.yaml
//! lint_rules:
//!   resource: yamllint.yaml
//!   output: .yamllint.yaml
//! timeout_secs: 30
//! retries: 2
//! strategy: text
//! rules:
//!   - pattern: k8s
//!     profile: kubernetes
//! ```
//!
//! A `rules` list replaces the built-in table entirely; `extra_rules` is
//! appended to it instead.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::compose::MergeStrategy;
use crate::error::{Error, Result};
use crate::guard::BotIdentityDetector;
use crate::profile::{default_rules, NameRule};
use crate::source::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS, LINT_RULES_RESOURCE};

/// Default settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = ".lint-profiles.yaml";

/// Default path of the profile declaration file.
pub const DECLARATION_FILE: &str = ".lint-profiles";

/// Default path of the composed configuration.
pub const OUTPUT_FILE: &str = ".pre-commit-config.yaml";

/// Default path of the auxiliary lint-rule configuration.
pub const LINT_RULES_FILE: &str = ".yamllint.yaml";

/// Where the auxiliary lint-rule configuration comes from and goes to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintRulesSettings {
    /// Upstream resource key.
    pub resource: String,
    /// Destination path, relative to the repository root.
    pub output: PathBuf,
    /// Set to `false` to skip the auxiliary fetch.
    pub enabled: bool,
}

impl Default for LintRulesSettings {
    fn default() -> Self {
        Self {
            resource: LINT_RULES_RESOURCE.to_string(),
            output: PathBuf::from(LINT_RULES_FILE),
            enabled: true,
        }
    }
}

/// All tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Upstream root: an `http(s)://` URL, a `file://` URL or a local path.
    pub upstream: Option<String>,
    pub declaration_file: PathBuf,
    pub output: PathBuf,
    pub lint_rules: LintRulesSettings,
    pub timeout_secs: u64,
    pub retries: u32,
    pub strategy: MergeStrategy,
    /// Replaces the built-in name rules when set.
    pub rules: Option<Vec<NameRule>>,
    /// Appended to the active name rules.
    pub extra_rules: Vec<NameRule>,
    pub guard: BotIdentityDetector,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upstream: None,
            declaration_file: PathBuf::from(DECLARATION_FILE),
            output: PathBuf::from(OUTPUT_FILE),
            lint_rules: LintRulesSettings::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            strategy: MergeStrategy::default(),
            rules: None,
            extra_rules: Vec::new(),
            guard: BotIdentityDetector::default(),
        }
    }
}

impl Settings {
    /// The active name-rule table.
    pub fn name_rules(&self) -> Vec<NameRule> {
        let mut rules = self.rules.clone().unwrap_or_else(default_rules);
        rules.extend(self.extra_rules.iter().cloned());
        rules
    }

    /// The configured upstream, or an error explaining how to set one.
    pub fn require_upstream(&self) -> Result<&str> {
        self.upstream.as_deref().ok_or_else(|| Error::ConfigParse {
            message: "no upstream profile location configured".to_string(),
            hint: Some(format!(
                "Pass --upstream, set LINT_PROFILES_UPSTREAM, or add 'upstream:' to {}",
                SETTINGS_FILE
            )),
        })
    }

    fn validate(&self) -> Result<()> {
        if let Some(upstream) = &self.upstream {
            if upstream.starts_with("http://") || upstream.starts_with("https://") {
                Url::parse(upstream).map_err(|e| Error::ConfigParse {
                    message: format!("invalid upstream URL '{}': {}", upstream, e),
                    hint: None,
                })?;
            }
        }
        if self.timeout_secs == 0 {
            return Err(Error::ConfigParse {
                message: "timeout_secs must be greater than zero".to_string(),
                hint: None,
            });
        }
        if let Some(rule) = self
            .name_rules()
            .iter()
            .find(|r| r.pattern.trim().is_empty() || r.profile.trim().is_empty())
        {
            return Err(Error::ConfigParse {
                message: format!(
                    "name rule with empty pattern or profile: {:?} -> {:?}",
                    rule.pattern, rule.profile
                ),
                hint: None,
            });
        }
        Ok(())
    }
}

/// Parses settings from YAML text. Empty text yields the defaults.
pub fn parse(yaml: &str) -> Result<Settings> {
    let has_content = yaml
        .lines()
        .map(str::trim)
        .any(|l| !l.is_empty() && !l.starts_with('#') && l != "---");
    let settings: Settings = if has_content {
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: None,
        })?
    } else {
        Settings::default()
    };
    settings.validate()?;
    Ok(settings)
}

/// Reads settings from a file.
pub fn from_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    parse(&content).map_err(|e| match e {
        Error::ConfigParse { message, hint } => Error::ConfigParse {
            message: format!("{}: {}", path.display(), message),
            hint,
        },
        other => other,
    })
}

/// User-level settings file, e.g. `~/.config/lint-profiles/settings.yaml`.
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lint-profiles").join("settings.yaml"))
}

/// Loads settings for a repository.
///
/// An explicit path must exist. Without one, `.lint-profiles.yaml` in
/// `repo_dir` is used if present, then the user-level file, then defaults.
pub fn load(explicit: Option<&Path>, repo_dir: &Path) -> Result<Settings> {
    if let Some(path) = explicit {
        return from_file(path);
    }

    let local = repo_dir.join(SETTINGS_FILE);
    if local.is_file() {
        return from_file(&local);
    }

    match user_settings_path() {
        Some(path) if path.is_file() => from_file(&path),
        _ => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_yields_defaults() {
        let settings = parse("# nothing configured\n").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.output, PathBuf::from(".pre-commit-config.yaml"));
        assert_eq!(settings.declaration_file, PathBuf::from(".lint-profiles"));
        assert_eq!(settings.lint_rules.output, PathBuf::from(".yamllint.yaml"));
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.strategy, MergeStrategy::Text);
    }

    #[test]
    fn test_parse_full_settings() {
        let yaml = r#"
upstream: https://config.example.com/lint
output: build/.pre-commit-config.yaml
timeout_secs: 5
retries: 0
strategy: structural
lint_rules:
  enabled: false
guard:
  bot_identity: lint-bot
  skip_marker: "[bot]"
"#;
        let settings = parse(yaml).unwrap();
        assert_eq!(
            settings.upstream.as_deref(),
            Some("https://config.example.com/lint")
        );
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.retries, 0);
        assert_eq!(settings.strategy, MergeStrategy::Structural);
        assert!(!settings.lint_rules.enabled);
        assert_eq!(settings.lint_rules.resource, "yamllint.yaml");
        assert_eq!(settings.guard.bot_identity, "lint-bot");
    }

    #[test]
    fn test_rules_replace_builtin_table() {
        let yaml = "rules:\n  - pattern: svc\n    profile: service\n";
        let settings = parse(yaml).unwrap();
        assert_eq!(settings.name_rules(), vec![NameRule::new("svc", "service")]);
    }

    #[test]
    fn test_extra_rules_extend_builtin_table() {
        let yaml = "extra_rules:\n  - pattern: pulumi\n    profile: pulumi\n";
        let settings = parse(yaml).unwrap();
        let rules = settings.name_rules();
        assert_eq!(rules.len(), default_rules().len() + 1);
        assert_eq!(rules.last().unwrap(), &NameRule::new("pulumi", "pulumi"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = parse("upstrem: https://typo.example.com\n");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_invalid_upstream_url() {
        let result = parse("upstream: 'https://exa mple.com'\n");
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse("timeout_secs: 0\n").is_err());
    }

    #[test]
    fn test_empty_rule_rejected() {
        assert!(parse("extra_rules:\n  - pattern: ''\n    profile: x\n").is_err());
    }

    #[test]
    fn test_require_upstream_hint() {
        let err = Settings::default().require_upstream().unwrap_err();
        assert!(err.to_string().contains("LINT_PROFILES_UPSTREAM"));
    }

    #[test]
    fn test_load_prefers_local_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(SETTINGS_FILE),
            "upstream: /srv/lint-profiles\n",
        )
        .unwrap();
        let settings = load(None, temp.path()).unwrap();
        assert_eq!(settings.upstream.as_deref(), Some("/srv/lint-profiles"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = load(Some(&temp.path().join("missing.yaml")), temp.path());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_file_prefixes_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.yaml");
        fs::write(&path, "retries: many\n").unwrap();
        let err = from_file(&path).unwrap_err().to_string();
        assert!(err.contains("settings.yaml"));
    }
}
