//! Configuration file handling for Forge
//!
//! This module contains data structures and loaders for:
//! - `forge.yaml` - Bundle manifest
//! - `flux.yaml` - Separate flux schema file (wins over the manifest's `flux`)
//! - `partial.yaml` - Partial manifest (directory-form partials)
//! - Defaults files supplied with `--defaults` / `FORGE_DEFAULTS`

pub mod bundle;
pub mod defaults;
pub mod partial;
pub mod schema;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value as YamlValue;

use crate::error::{Result, config::parse_failed, fs::read_failed};
use crate::flux::context::yaml_scalar_text;

// Re-export commonly used types
pub use bundle::{BundleDependency, BundleManifest, FluxDeclaration};
pub use defaults::load_defaults;
pub use partial::PartialManifest;
pub use schema::{SchemaFile, effective_schema};

/// Bundle manifest file names, in lookup order
pub const MANIFEST_FILES: &[&str] = &["forge.yaml", "forge.yml"];

/// Flux schema file names, in lookup order
pub const SCHEMA_FILES: &[&str] = &["flux.yaml", "flux.yml"];

/// Partial manifest file name
pub const PARTIAL_MANIFEST_FILE: &str = "partial.yaml";

/// What a directory holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    Bundle,
    Partial,
    Unknown,
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleKind::Bundle => f.write_str("bundle"),
            BundleKind::Partial => f.write_str("partial"),
            BundleKind::Unknown => f.write_str("unknown"),
        }
    }
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|p| p.is_file())
}

/// Path of the bundle manifest in `dir`, if any
pub fn find_manifest(dir: &Path) -> Option<PathBuf> {
    first_existing(dir, MANIFEST_FILES)
}

/// Path of the flux schema file in `dir`, if any
pub fn find_schema(dir: &Path) -> Option<PathBuf> {
    first_existing(dir, SCHEMA_FILES)
}

/// Detect whether `dir` is a bundle, a partial, or neither
pub fn detect_kind(dir: &Path) -> BundleKind {
    if find_manifest(dir).is_some() {
        BundleKind::Bundle
    } else if dir.join(PARTIAL_MANIFEST_FILE).is_file() {
        BundleKind::Partial
    } else {
        BundleKind::Unknown
    }
}

/// Parse YAML text; an empty document counts as an empty mapping
pub(crate) fn parse_yaml<T: DeserializeOwned>(text: &str, origin: &str) -> Result<T> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    serde_yaml::from_str(text).map_err(|e| parse_failed(origin, e.to_string()))
}

/// Read and parse a YAML file
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| read_failed(path.display().to_string(), e.to_string()))?;
    parse_yaml(&text, &path.display().to_string())
}

/// Accept any YAML scalar (`1.0`, `"1.0"`) as an optional string
pub(crate) fn scalar_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<YamlValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(yaml_scalar_text))
}
