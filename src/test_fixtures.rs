//! Test fixtures for building bundles on disk.
//!
//! ```ignore
//! use crate::test_fixtures::{create_bundle, create_temp_dir};
//!
//! let bundle = create_bundle(&[
//!     ("forge.yaml", "name: demo\nversion: 1.0.0\n"),
//!     ("commands/review.md", "Review for {{org}}"),
//! ]);
//! ```

use std::path::Path;

use tempfile::TempDir;

/// Minimal valid manifest used when a test only cares about the file tree
pub const MINIMAL_MANIFEST: &str = "name: demo\nversion: 1.0.0\n";

/// Create an empty temp directory.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("forge-test-")
        .tempdir()
        .expect("Failed to create temp directory")
}

/// Write `(path, content)` pairs under `root`, creating parent directories.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// Create a temp directory holding the given bundle files.
///
/// # Panics
///
/// Panics if any step fails.
#[must_use]
pub fn create_bundle(files: &[(&str, &str)]) -> TempDir {
    let temp = create_temp_dir();
    write_files(temp.path(), files);
    temp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_bundle_writes_nested_files() {
        let bundle = create_bundle(&[
            ("forge.yaml", MINIMAL_MANIFEST),
            ("commands/deep/a.md", "a"),
        ]);
        assert!(bundle.path().join("forge.yaml").is_file());
        assert_eq!(
            std::fs::read_to_string(bundle.path().join("commands/deep/a.md")).unwrap(),
            "a"
        );
    }
}
