//! YAML merge operations
//!
//! Folds one YAML document into another at the structural level, so merged
//! fragments never produce stray document-start markers or duplicate keys.
//!
//! ## Rules
//!
//! - Mappings merge recursively, key by key.
//! - Sequences append the entries that are not already present. Appending
//!   the same pre-commit repo twice is a no-op.
//! - When both sides hold a scalar, or the types disagree, the earlier value
//!   wins and a warning is logged. `base` therefore keeps the final say on
//!   anything it defines.
//! - A null target (an empty document) takes the source as is.
//!
//! At the document root, a fragment that is a bare sequence is a
//! continuation of the base's `repos:` list and is appended there. Any other
//! root-level mismatch rejects the whole fragment.

use log::warn;
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};

/// Top-level key holding the hook repositories of a pre-commit config.
pub const REPOS_KEY: &str = "repos";

/// Parses fragment text into a YAML value.
///
/// Documents holding only comments, blank lines or a bare `---` marker parse
/// to `Null`.
pub fn parse_document(text: &str, name: &str) -> Result<YamlValue> {
    let has_content = text.lines().map(str::trim).any(|line| {
        !line.is_empty() && !line.starts_with('#') && line != "---" && line != "..."
    });
    if !has_content {
        return Ok(YamlValue::Null);
    }

    serde_yaml::from_str(text).map_err(|err| Error::Merge {
        operation: format!("parse {}", name),
        message: err.to_string(),
    })
}

/// Serializes a merged document back to text.
///
/// The output starts with a `---` marker when `with_marker` is set and always
/// ends with a newline.
pub fn render_document(value: &YamlValue, with_marker: bool) -> Result<String> {
    let body = if value.is_null() {
        String::new()
    } else {
        serde_yaml::to_string(value).map_err(|err| Error::Merge {
            operation: "render".to_string(),
            message: err.to_string(),
        })?
    };

    let mut out = String::new();
    if with_marker {
        out.push_str("---\n");
    }
    out.push_str(&body);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Folds a whole fragment document into the accumulated document.
///
/// # Errors
///
/// Returns `Error::Merge` when the fragment's root cannot be merged into the
/// document's root. The document is left unchanged in that case.
pub fn merge_fragment(document: &mut YamlValue, fragment: &YamlValue, name: &str) -> Result<()> {
    match (&mut *document, fragment) {
        (_, YamlValue::Null) | (YamlValue::Null, _) => {}
        (YamlValue::Mapping(_), YamlValue::Mapping(_))
        | (YamlValue::Sequence(_), YamlValue::Sequence(_)) => {}
        (YamlValue::Mapping(map), YamlValue::Sequence(entries)) => {
            let key = YamlValue::String(REPOS_KEY.to_string());
            match map.get_mut(&key) {
                None | Some(YamlValue::Null) => {
                    map.insert(key, YamlValue::Sequence(entries.clone()));
                }
                Some(repos @ YamlValue::Sequence(_)) => {
                    merge_yaml_values(repos, fragment, REPOS_KEY, name);
                }
                Some(other) => {
                    return Err(Error::Merge {
                        operation: format!("merge {}", name),
                        message: format!(
                            "cannot append entries to '{}' of type {}",
                            REPOS_KEY,
                            get_yaml_type_name(other)
                        ),
                    });
                }
            }
            return Ok(());
        }
        (target, source) => {
            return Err(Error::Merge {
                operation: format!("merge {}", name),
                message: format!(
                    "document root is {}, fragment root is {}",
                    get_yaml_type_name(target),
                    get_yaml_type_name(source)
                ),
            });
        }
    }

    merge_yaml_values(document, fragment, "", name);
    Ok(())
}

/// Recursively merges `source` into `target`.
///
/// # Arguments
///
/// * `target` - The accumulated document (modified in place)
/// * `source` - The fragment being folded in
/// * `path` - Current path, for log messages
/// * `fragment` - Name of the fragment, for log messages
pub fn merge_yaml_values(target: &mut YamlValue, source: &YamlValue, path: &str, fragment: &str) {
    if source.is_null() {
        return;
    }

    match target {
        YamlValue::Null => {
            *target = source.clone();
        }
        YamlValue::Mapping(target_map) => {
            let Some(source_map) = source.as_mapping() else {
                warn!(
                    "{}: Type mismatch at path '{}': keeping Mapping, ignoring {}",
                    fragment,
                    display_path(path),
                    get_yaml_type_name(source)
                );
                return;
            };

            for (key, value) in source_map {
                let key_str = match key {
                    YamlValue::String(s) => s.clone(),
                    _ => format!("{:?}", key),
                };
                let new_path = if path.is_empty() {
                    key_str
                } else {
                    format!("{}.{}", path, key_str)
                };

                match target_map.get_mut(key) {
                    Some(existing) => merge_yaml_values(existing, value, &new_path, fragment),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        YamlValue::Sequence(target_seq) => {
            let Some(source_seq) = source.as_sequence() else {
                warn!(
                    "{}: Type mismatch at path '{}': keeping Sequence, ignoring {}",
                    fragment,
                    display_path(path),
                    get_yaml_type_name(source)
                );
                return;
            };

            for item in source_seq {
                if !target_seq.contains(item) {
                    target_seq.push(item.clone());
                }
            }
        }
        _ => {
            if *target != *source {
                warn!(
                    "{}: Conflicting value at path '{}': keeping {:?}, ignoring {:?}",
                    fragment,
                    display_path(path),
                    target,
                    source
                );
            }
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Get a human-readable type name for a YAML value
pub fn get_yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "Null",
        YamlValue::Bool(_) => "Bool",
        YamlValue::Number(_) => "Number",
        YamlValue::String(_) => "String",
        YamlValue::Sequence(_) => "Sequence",
        YamlValue::Mapping(_) => "Mapping",
        YamlValue::Tagged(_) => "Tagged",
    }
}
