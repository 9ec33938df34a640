//! Partial manifest (partial.yaml)
//!
//! A directory-form partial lists the files that make up its content; they are
//! concatenated in order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PARTIAL_MANIFEST_FILE;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "super::scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Files relative to the partial directory, concatenated in order
    #[serde(default)]
    pub files: Vec<String>,
}

impl PartialManifest {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        super::parse_yaml(yaml, PARTIAL_MANIFEST_FILE)
    }

    /// Load `<dir>/partial.yaml`
    pub fn load(dir: &Path) -> Result<Self> {
        super::read_yaml(&dir.join(PARTIAL_MANIFEST_FILE))
    }
}
