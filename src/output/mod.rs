//! Output mapping: where each bundle file lands in the target project
//!
//! The manifest's `output` field takes one of three shapes:
//!
//! - absent: every non-reserved top-level directory and root-level file keeps
//!   its path
//! - a single string: top-level directories are re-rooted under that parent;
//!   root-level files stay at the project root
//! - a mapping from source directory or file to a destination (a string, or
//!   `{dest, process}`); anything the mapping doesn't cover falls back to the
//!   absent rules

pub mod tree;


use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tracing::debug;

use crate::domain::ResolvedFile;
use crate::error::{Result, config::invalid, output::missing_source};

pub use tree::{SourceTree, normalize};

/// Top-level directories never auto-discovered
pub const RESERVED_DIRS: &[&str] = &[".git", ".github", "partials", "node_modules"];

/// Root-level metadata files never auto-discovered
pub const RESERVED_FILES: &[&str] = &[
    "forge.yaml",
    "forge.yml",
    "flux.yaml",
    "flux.yml",
    "partial.yaml",
    "README.md",
    "LICENSE",
    "CHANGELOG.md",
    ".gitignore",
];

/// Destination descriptor of one explicit mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dest: String,
    pub process: bool,
}

impl OutputTarget {
    pub fn new(dest: impl Into<String>, process: bool) -> Self {
        Self {
            dest: normalize(&dest.into()),
            process,
        }
    }
}

/// Declared output shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputSpec {
    #[default]
    Absent,
    Parent(String),
    Explicit(BTreeMap<String, OutputTarget>),
}

fn default_process() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Dest(String),
    Descriptor {
        dest: String,
        #[serde(default = "default_process")]
        process: bool,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOutput {
    Parent(String),
    Map(BTreeMap<String, RawTarget>),
}

impl OutputSpec {
    /// Interpret the manifest's raw `output` value
    pub fn from_yaml(value: Option<&YamlValue>) -> Result<Self> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(OutputSpec::Absent);
        };
        let raw: RawOutput = serde_yaml::from_value(value.clone()).map_err(|_| {
            invalid(
                "output must be a parent path or a mapping of source to destination \
                 (a path or {dest, process})",
            )
        })?;
        Ok(match raw {
            RawOutput::Parent(parent) => OutputSpec::Parent(normalize(&parent)),
            RawOutput::Map(map) => OutputSpec::Explicit(
                map.into_iter()
                    .map(|(key, target)| {
                        let target = match target {
                            RawTarget::Dest(dest) => OutputTarget::new(dest, true),
                            RawTarget::Descriptor { dest, process } => {
                                OutputTarget::new(dest, process)
                            }
                        };
                        (normalize(&key), target)
                    })
                    .collect(),
            ),
        })
    }

    /// Resolved files for `tree`, sorted by source path
    pub fn resolve(&self, tree: &SourceTree) -> Result<Vec<ResolvedFile>> {
        let files = match self {
            OutputSpec::Absent => resolve_absent(tree),
            OutputSpec::Parent(parent) => resolve_parent(parent, tree),
            OutputSpec::Explicit(map) => resolve_explicit(map, tree)?,
        };
        debug!(count = files.len(), "resolved output files");
        Ok(files)
    }
}

/// Destination under the auto-discovery rules, or `None` for reserved paths
fn discovered_destination(path: &str, parent: Option<&str>) -> Option<String> {
    match path.split_once('/') {
        Some((top, _)) => {
            if RESERVED_DIRS.contains(&top) {
                None
            } else {
                Some(match parent {
                    Some(parent) => join(parent, path),
                    None => path.to_string(),
                })
            }
        }
        None if RESERVED_FILES.contains(&path) => None,
        None => Some(path.to_string()),
    }
}

fn join(prefix: &str, rest: &str) -> String {
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{prefix}/{rest}"),
    }
}

/// Identity mapping of every non-reserved file
pub fn resolve_absent(tree: &SourceTree) -> Vec<ResolvedFile> {
    tree.iter()
        .filter_map(|path| {
            discovered_destination(path, None).map(|dest| ResolvedFile::new(path, dest, true))
        })
        .collect()
}

/// Like [`resolve_absent`], with top-level directories re-rooted under `parent`
pub fn resolve_parent(parent: &str, tree: &SourceTree) -> Vec<ResolvedFile> {
    let parent = normalize(parent);
    if parent.is_empty() {
        return resolve_absent(tree);
    }
    tree.iter()
        .filter_map(|path| {
            discovered_destination(path, Some(&parent))
                .map(|dest| ResolvedFile::new(path, dest, true))
        })
        .collect()
}

/// Apply explicit mappings; uncovered files fall back to the absent rules
pub fn resolve_explicit(
    map: &BTreeMap<String, OutputTarget>,
    tree: &SourceTree,
) -> Result<Vec<ResolvedFile>> {
    if map.contains_key("") {
        return Err(invalid("output mapping keys must name a file or directory"));
    }

    let mut file_keys = BTreeMap::new();
    let mut dir_keys = Vec::new();
    for (key, target) in map {
        if tree.contains_file(key) {
            file_keys.insert(key.as_str(), target);
        } else if tree.contains_dir(key) {
            dir_keys.push((key.as_str(), target));
        } else {
            return Err(missing_source(key.clone()));
        }
    }
    // Most specific directory first
    dir_keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

    let mut files = Vec::new();
    for path in tree.iter() {
        if let Some(target) = file_keys.get(path.as_str()) {
            let dest = if target.dest.is_empty() {
                path.clone()
            } else {
                target.dest.clone()
            };
            files.push(ResolvedFile::new(path, dest, target.process));
            continue;
        }

        let enclosing = dir_keys.iter().find_map(|(dir, target)| {
            path.strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| (rest, *target))
        });
        if let Some((rest, target)) = enclosing {
            files.push(ResolvedFile::new(path, join(&target.dest, rest), target.process));
            continue;
        }

        if let Some(dest) = discovered_destination(path, None) {
            files.push(ResolvedFile::new(path, dest, true));
        }
    }
    files.sort();
    Ok(files)
}
