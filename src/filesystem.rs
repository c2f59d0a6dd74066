//! Writing generated files to disk.
//!
//! Outputs are replaced atomically: content goes to a temporary sibling file
//! which is then renamed over the destination. A reader (or a crash) never
//! observes a half-written configuration, and prior content is fully
//! replaced rather than appended to.
//!
//! An existing destination keeps its permissions. When the destination is a
//! symlink, the file it points to is replaced and the link stays in place.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Writes `content` to `path`, replacing any existing file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let resolved = resolve_symlink(path);
    let path = resolved.as_path();
    let existing_permissions = fs::metadata(path).ok().map(|m| m.permissions());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Same directory keeps the rename on one filesystem.
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let result = (|| -> Result<()> {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        if let Some(permissions) = existing_permissions {
            fs::set_permissions(&temp_path, permissions)?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Follows `path` when it is a symlink. Dangling links resolve to their
/// target path so the write creates it.
fn resolve_symlink(path: &Path) -> PathBuf {
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link {
        return path.to_path_buf();
    }

    match fs::read_link(path) {
        Ok(target) if target.is_absolute() => target,
        Ok(target) => path
            .parent()
            .map(|parent| parent.join(&target))
            .unwrap_or(target),
        Err(_) => path.to_path_buf(),
    }
}

/// Writes text content atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
