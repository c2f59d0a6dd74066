//! # Upstream Fragment Sources
//!
//! Profiles live upstream as plain text resources keyed by a relative path
//! (`profiles/<name>.yaml`). This module abstracts how those resources are
//! retrieved behind the [`FragmentSource`] trait, so the composer never knows
//! whether it talks to a web server, a local checkout or a test fixture.
//!
//! ## Implementations
//!
//! - **`HttpSource`**: blocking HTTP(S) client with a per-request timeout.
//! - **`DirectorySource`**: reads resources from a local directory.
//! - **`MemorySource`**: an in-memory map, handy in tests and for embedding.
//! - **`RetryingSource`**: wraps another source and retries transient
//!   failures with doubling backoff.
//!
//! Use [`open_source`] to pick an implementation from an upstream location
//! string.

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};
use crate::profile::ProfileName;

/// Resource key of the auxiliary lint-rule configuration.
pub const LINT_RULES_RESOURCE: &str = "yamllint.yaml";

/// Default per-request timeout for remote sources.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for transient failures.
pub const DEFAULT_RETRIES: u32 = 2;

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);

/// Trait for retrieving raw text resources by key - allows mocking in tests
pub trait FragmentSource: Send + Sync {
    /// Fetches the resource stored under `key`.
    ///
    /// Returns `Error::NotFound` when the source has no such resource, and
    /// `Error::Network` or `Error::Timeout` for transport failures.
    fn fetch(&self, key: &str) -> Result<String>;

    /// Human-readable location of `key`, used in log messages.
    fn describe(&self, key: &str) -> String {
        key.to_string()
    }
}

impl<S: FragmentSource + ?Sized> FragmentSource for Box<S> {
    fn fetch(&self, key: &str) -> Result<String> {
        (**self).fetch(key)
    }

    fn describe(&self, key: &str) -> String {
        (**self).describe(key)
    }
}

/// Builds the upstream resource key for a profile.
///
/// Profile tokens come verbatim from user-edited files, so anything that is
/// not a plain `[A-Za-z0-9._-]` name (or starts with a dot) is rejected
/// rather than being allowed to address arbitrary upstream paths.
pub fn profile_resource_key(profile: &ProfileName) -> Result<String> {
    let name = profile.as_str();
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(Error::InvalidProfile {
            name: name.to_string(),
        });
    }
    Ok(format!("profiles/{}.yaml", name))
}

/// Fetches resources over HTTP(S).
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base: Url,
    timeout: Duration,
}

impl HttpSource {
    /// Creates a source rooted at `base`. A trailing slash is added when
    /// missing so keys resolve beneath the base path.
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lint-profiles/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                url: base.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    fn url_for(&self, key: &str) -> Result<Url> {
        Ok(self.base.join(key)?)
    }
}

impl FragmentSource for HttpSource {
    fn fetch(&self, key: &str) -> Result<String> {
        let url = self.url_for(key)?;
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                Error::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                resource: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::Network {
                url: url.to_string(),
                message: format!("unexpected status {}", status),
            });
        }

        response.text().map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                Error::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn describe(&self, key: &str) -> String {
        self.url_for(key)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| key.to_string())
    }
}

/// Reads resources from a local directory, e.g. a checkout of the upstream
/// profile repository.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FragmentSource for DirectorySource {
    fn fetch(&self, key: &str) -> Result<String> {
        let path = self.root.join(key);
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound {
                resource: path.display().to_string(),
            },
            _ => Error::Io(e),
        })
    }

    fn describe(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }
}

/// An in-memory source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    resources: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a resource.
    pub fn insert(&mut self, key: impl Into<String>, content: impl Into<String>) {
        self.resources.insert(key.into(), content.into());
    }

    /// Builder-style variant of [`MemorySource::insert`] for a profile.
    pub fn with_profile(mut self, profile: &str, content: &str) -> Self {
        self.insert(format!("profiles/{}.yaml", profile), content);
        self
    }

    /// Builder-style variant of [`MemorySource::insert`].
    pub fn with_resource(mut self, key: &str, content: &str) -> Self {
        self.insert(key, content);
        self
    }
}

impl FragmentSource for MemorySource {
    fn fetch(&self, key: &str) -> Result<String> {
        self.resources
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                resource: key.to_string(),
            })
    }
}

/// Retries transient failures of an inner source.
///
/// The delay starts at 250 ms and doubles after every attempt, without
/// jitter. At most `retries` extra attempts are made.
pub struct RetryingSource<S> {
    inner: S,
    retries: u32,
    initial_backoff: Duration,
}

impl<S: FragmentSource> RetryingSource<S> {
    pub fn new(inner: S, retries: u32) -> Self {
        Self {
            inner,
            retries,
            initial_backoff: INITIAL_BACKOFF,
        }
    }

    /// Overrides the delay before the first retry. Later retries double it.
    pub fn with_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    fn policy(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_interval(Duration::from_secs(60))
            .with_max_elapsed_time(None)
            .build()
    }
}

impl<S: FragmentSource> FragmentSource for RetryingSource<S> {
    fn fetch(&self, key: &str) -> Result<String> {
        let mut attempt = 0;
        let operation = || {
            let result = self.inner.fetch(key);
            attempt += 1;
            result.map_err(|e| {
                if e.is_transient() && attempt <= self.retries {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        };
        let notify = |e: Error, delay: Duration| {
            warn!(
                "Fetching {} failed ({}), retrying in {:?}",
                self.inner.describe(key),
                e,
                delay
            );
        };

        backoff::retry_notify(self.policy(), operation, notify).map_err(|e| match e {
            backoff::Error::Permanent(err) => err,
            backoff::Error::Transient { err, .. } => err,
        })
    }

    fn describe(&self, key: &str) -> String {
        self.inner.describe(key)
    }
}

/// Opens a source for an upstream location.
///
/// `http://` and `https://` locations use [`HttpSource`]; `file://` URLs and
/// plain paths use [`DirectorySource`]. Every source is wrapped in a
/// [`RetryingSource`].
pub fn open_source(
    upstream: &str,
    timeout: Duration,
    retries: u32,
) -> Result<Box<dyn FragmentSource>> {
    let upstream = upstream.trim();
    if upstream.is_empty() {
        return Err(Error::ConfigParse {
            message: "upstream location is empty".to_string(),
            hint: Some("Pass --upstream or set LINT_PROFILES_UPSTREAM".to_string()),
        });
    }

    if upstream.starts_with("http://") || upstream.starts_with("https://") {
        let url = Url::parse(upstream)?;
        let http = HttpSource::new(url, timeout)?;
        return Ok(Box::new(RetryingSource::new(http, retries)));
    }

    if upstream.starts_with("file://") {
        let url = Url::parse(upstream)?;
        let path = url.to_file_path().map_err(|_| Error::ConfigParse {
            message: format!("'{}' is not a valid file URL", upstream),
            hint: None,
        })?;
        return Ok(Box::new(RetryingSource::new(
            DirectorySource::new(path),
            retries,
        )));
    }

    Ok(Box::new(RetryingSource::new(
        DirectorySource::new(upstream),
        retries,
    )))
}
