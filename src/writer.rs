//! Writing rendered and copied files into the target project
//!
//! This module handles:
//! - Mapping bundle-relative destinations onto the target directory
//! - Ensuring parent directories exist before writing
//! - Atomic writes (temp file in the same directory, then rename)

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, config::invalid, fs::write_failed};

fn file_write_error(path: &Path, e: impl ToString) -> crate::error::ForgeError {
    write_failed(path.display().to_string(), e.to_string())
}

/// Join a destination onto `target`, rejecting paths that leave it
pub fn target_path(target: &Path, destination: &str) -> Result<PathBuf> {
    let relative = Path::new(destination);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if destination.is_empty() || escapes {
        return Err(invalid(format!(
            "output destination '{destination}' must be a relative path inside the target"
        )));
    }
    Ok(target.join(relative))
}

/// Ensure parent directory exists for a path
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| file_write_error(parent, e))?;
    }
    Ok(())
}

/// Write `content` to `path` atomically
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| file_write_error(path, e))?;
    temp.write_all(content)
        .map_err(|e| file_write_error(path, e))?;
    temp.persist(path).map_err(|e| file_write_error(path, e.error))?;
    Ok(())
}

/// Copy `source` verbatim to `target`
pub fn copy_file(source: &Path, target: &Path) -> Result<()> {
    let content = std::fs::read(source).map_err(|e| {
        crate::error::fs::read_failed(source.display().to_string(), e.to_string())
    })?;
    write_atomic(target, &content)
}
