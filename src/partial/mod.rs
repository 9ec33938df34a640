//! Partial resolution
//!
//! A partial is a named, reusable document fragment. Partials are looked up
//! across an ordered list of roots; the first root holding a match wins. In a
//! root, a directory-form partial (`<name>/partial.yaml` listing files to
//! concatenate) wins over a bare document (`<name>.md`).
//!
//! Matched content is rendered like any other document, with the same data,
//! so partials can pull in further partials. A call-scoped stack of names in
//! progress turns self-reference at any depth into an error.

use std::path::{Component, Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::{PARTIAL_MANIFEST_FILE, PartialManifest};
use crate::error::{
    Result,
    config::invalid,
    fs::{not_found as file_not_found, read_failed},
    partial::{circular, not_found},
};
use crate::template::{self, PartialLookup, RenderScope};

/// Partials directory inside a bundle
pub const PARTIALS_DIR: &str = "partials";

/// Extension of bare-document partials
pub const PARTIAL_EXT: &str = "md";

/// Environment variable holding extra partial roots (OS path-list syntax)
pub const PARTIALS_PATH_ENV: &str = "FORGE_PARTIALS_PATH";

/// Looks up partials across ordered roots
#[derive(Debug, Clone, Default)]
pub struct PartialResolver {
    roots: Vec<PathBuf>,
}

/// Where a partial was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSource {
    pub path: PathBuf,
    pub content: String,
}

impl PartialResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Roots for rendering the bundle in `bundle_dir`: its `partials/`, then
    /// `extra` roots, then `FORGE_PARTIALS_PATH`, then the user data directory.
    pub fn for_bundle(bundle_dir: &Path, extra: &[PathBuf]) -> Self {
        let mut roots = vec![bundle_dir.join(PARTIALS_DIR)];
        roots.extend(extra.iter().cloned());
        roots.extend(env_roots());
        roots.extend(user_root());
        debug!(roots = ?roots, "partial search path");
        Self::new(roots)
    }

    #[cfg(test)]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Find the raw content of `name`, or `None` when no root has it
    pub fn lookup(&self, name: &str) -> Result<Option<PartialSource>> {
        if !is_safe_name(name) {
            return Ok(None);
        }
        for root in &self.roots {
            let dir = root.join(name);
            if dir.join(PARTIAL_MANIFEST_FILE).is_file() {
                return read_manifest_partial(&dir).map(Some);
            }
            let file = root.join(format!("{name}.{PARTIAL_EXT}"));
            if file.is_file() {
                let content = std::fs::read_to_string(&file)
                    .map_err(|e| read_failed(file.display().to_string(), e.to_string()))?;
                return Ok(Some(PartialSource {
                    path: file,
                    content,
                }));
            }
        }
        Ok(None)
    }

    /// Raw content of `name`; not found is an error
    pub fn load(&self, name: &str) -> Result<PartialSource> {
        self.lookup(name)?.ok_or_else(|| not_found(name))
    }

    /// Resolve and render `name` as a top-level call with its own cycle stack
    #[cfg(test)]
    pub fn resolve(
        &self,
        name: &str,
        data: &JsonValue,
        sink: &mut Vec<crate::domain::Diagnostic>,
    ) -> Result<String> {
        let mut scope = RenderScope::new(Some(self), sink);
        self.expand(name, data, &mut scope)
    }
}

impl PartialLookup for PartialResolver {
    fn expand(&self, name: &str, data: &JsonValue, scope: &mut RenderScope<'_>) -> Result<String> {
        if scope.stack.iter().any(|n| n == name) {
            return Err(circular(&scope.stack, name));
        }
        let source = self.load(name)?;
        debug!(partial = name, path = %source.path.display(), "expanding partial");

        scope.stack.push(name.to_string());
        let result = template::render_in_scope(name, &source.content, data, scope);
        scope.stack.pop();
        result
    }
}

/// Names are relative paths that stay inside their root
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn read_manifest_partial(dir: &Path) -> Result<PartialSource> {
    let manifest = PartialManifest::load(dir)?;
    let mut content = String::new();
    for file in &manifest.files {
        if !is_safe_name(file) {
            return Err(invalid(format!(
                "{}: file '{file}' is outside the partial directory",
                dir.join(PARTIAL_MANIFEST_FILE).display()
            )));
        }
        let path = dir.join(file);
        if !path.is_file() {
            return Err(file_not_found(path.display().to_string()));
        }
        let part = std::fs::read_to_string(&path)
            .map_err(|e| read_failed(path.display().to_string(), e.to_string()))?;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&part);
    }
    Ok(PartialSource {
        path: dir.join(PARTIAL_MANIFEST_FILE),
        content,
    })
}

fn env_roots() -> Vec<PathBuf> {
    std::env::var_os(PARTIALS_PATH_ENV)
        .map(|value| {
            std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn user_root() -> Option<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("forge").join(PARTIALS_DIR))
        .filter(|dir| dir.is_dir())
}
