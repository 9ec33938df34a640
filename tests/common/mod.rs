//! Common test utilities for Forge integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch area holding bundles, defaults files and a render target
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Render target directory (`project/`), created on demand
    #[allow(dead_code)]
    pub fn project(&self) -> PathBuf {
        let project = self.path.join("project");
        std::fs::create_dir_all(&project).expect("Failed to create project directory");
        project
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Write several files under `bundles/<name>` and return the bundle path
    #[allow(dead_code)]
    pub fn create_bundle(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        for (path, content) in files {
            self.write_file(&format!("bundles/{name}/{path}"), content);
        }
        self.path.join("bundles").join(name)
    }

    /// Read a file from workspace
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Copy fixture bundle to `bundles/<target_name>`
    #[allow(dead_code)]
    pub fn copy_fixture_bundle(&self, fixture_name: &str, target_name: &str) -> PathBuf {
        let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("common")
            .join("fixtures")
            .join("bundles")
            .join(fixture_name);

        let target_path = self.path.join("bundles").join(target_name);
        copy_dir_recursive(&fixture_path, &target_path).expect("Failed to copy fixture bundle");
        target_path
    }

    /// A forge command running in the workspace, isolated from the
    /// developer's environment and user partials directory
    #[allow(deprecated)]
    pub fn forge_cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("forge").expect("forge binary not built");
        cmd.current_dir(&self.path);
        cmd.env_remove("FORGE_TARGET");
        cmd.env_remove("FORGE_DEFAULTS");
        cmd.env_remove("FORGE_PARTIALS_PATH");
        cmd.env_remove("RUST_LOG");
        cmd.env("XDG_DATA_HOME", self.path.join(".data"));
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        std::fs::create_dir_all(dst)?;
    }

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_workspace_copy_fixture_bundle() {
        let workspace = TestWorkspace::new();
        workspace.copy_fixture_bundle("review", "review");

        assert!(workspace.file_exists("bundles/review/forge.yaml"));
        assert!(workspace.file_exists("bundles/review/commands/review.md"));
        assert!(workspace.file_exists("bundles/review/partials/header.md"));
    }
}
