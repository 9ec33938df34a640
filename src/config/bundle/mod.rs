//! Bundle manifest (forge.yaml) main module
//!
//! This module handles the bundle manifest data structures and the flux
//! declarations they carry.

pub mod dependency;

use std::path::Path;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

use crate::domain::{DiscoverySpec, FluxSchema, FluxType, FluxVariable};
use crate::error::{Result, config::invalid};
use crate::flux::context::yaml_scalar_text;

// Re-export commonly used types
pub use dependency::BundleDependency;

fn default_type() -> String {
    "string".to_string()
}

/// A flux variable as written in YAML, before its type is checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxDeclaration {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default = "default_type")]
    pub kind: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<YamlValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<YamlValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discover: Option<DiscoverySpec>,
}

impl FluxDeclaration {
    /// Convert into a typed variable; the error names the variable and the bad type
    pub fn to_variable(&self) -> std::result::Result<FluxVariable, String> {
        if self.name.trim().is_empty() {
            return Err("flux variable with an empty name".to_string());
        }
        let kind: FluxType = self
            .kind
            .parse()
            .map_err(|e| format!("flux variable '{}': {e}", self.name))?;
        Ok(FluxVariable {
            name: self.name.clone(),
            kind,
            required: self.required,
            default: self.default.as_ref().and_then(yaml_scalar_text),
            options: self.options.iter().filter_map(yaml_scalar_text).collect(),
            prompt: self.prompt.clone(),
            discover: self.discover.clone(),
        })
    }
}

/// Build a schema from declarations, reporting every bad declaration at once
pub fn schema_from_declarations(declarations: &[FluxDeclaration]) -> Result<FluxSchema> {
    let mut variables = Vec::new();
    let mut problems = Vec::new();
    for decl in declarations {
        match decl.to_variable() {
            Ok(var) => variables.push(var),
            Err(problem) => problems.push(problem),
        }
    }
    if problems.is_empty() {
        Ok(FluxSchema::new(variables))
    } else {
        Err(invalid(problems.join("; ")))
    }
}

/// Bundle manifest from forge.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Bundle name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Bundle version (semantic version)
    #[serde(
        default,
        deserialize_with = "super::scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Bundle description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared flux variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flux: Vec<FluxDeclaration>,

    /// Bundle dependencies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<BundleDependency>,

    /// Version requirement on forge itself
    #[serde(
        default,
        deserialize_with = "super::scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workflows: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partials: Vec<String>,

    /// Raw output declaration (absent, a parent path, or a mapping)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<YamlValue>,
}

impl BundleManifest {
    /// Parse a bundle manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        super::parse_yaml(yaml, "forge.yaml")
    }

    /// Load the manifest of the bundle in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = super::find_manifest(dir)
            .ok_or_else(|| crate::error::config::manifest_not_found(dir.display().to_string()))?;
        super::read_yaml(&path)
    }

    /// Every shape problem found, in declaration order
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        match self.name.as_deref().map(str::trim) {
            None | Some("") => problems.push("missing required field 'name'".to_string()),
            Some(_) => {}
        }

        match self.version.as_deref() {
            None => problems.push("missing required field 'version'".to_string()),
            Some(version) => {
                if let Err(e) = Version::parse(version) {
                    problems.push(format!(
                        "version '{version}' is not a valid semantic version: {e}"
                    ));
                }
            }
        }

        if let Some(requires) = &self.requires {
            if let Err(e) = VersionReq::parse(requires) {
                problems.push(format!(
                    "requires '{requires}' is not a valid version requirement: {e}"
                ));
            }
        }

        for dep in &self.dependencies {
            if let Err(e) = dep.validate() {
                problems.push(e.to_string());
            }
        }

        for decl in &self.flux {
            if let Err(problem) = decl.to_variable() {
                problems.push(problem);
            }
        }

        problems
    }

    /// Validate the manifest shape, reporting every problem together
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(invalid(problems.join("; ")))
        }
    }

    /// Check `requires` against the running forge version
    pub fn check_requires(&self, current: &str) -> Result<()> {
        let Some(requires) = &self.requires else {
            return Ok(());
        };
        let req = VersionReq::parse(requires)
            .map_err(|e| invalid(format!("requires '{requires}': {e}")))?;
        let version = Version::parse(current)
            .map_err(|e| invalid(format!("forge version '{current}': {e}")))?;
        if req.matches(&version) {
            Ok(())
        } else {
            Err(invalid(format!(
                "bundle requires forge {requires}, but this is forge {current}"
            )))
        }
    }

    /// Schema declared inline in the manifest
    pub fn schema(&self) -> Result<FluxSchema> {
        schema_from_declarations(&self.flux)
    }

    /// Files listed by the manifest, with the list each came from
    pub fn referenced_files(&self) -> impl Iterator<Item = (&'static str, &String)> {
        let lists: [(&'static str, &Vec<String>); 4] = [
            ("commands", &self.commands),
            ("skills", &self.skills),
            ("workflows", &self.workflows),
            ("partials", &self.partials),
        ];
        lists
            .into_iter()
            .flat_map(|(list, files)| files.iter().map(move |f| (list, f)))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name: linear-workflows
version: 1.2.0
description: Linear helpers
requires: ">=0.3"
flux:
  - name: org
    required: true
  - name: board
    default: Engineering
  - name: count
    type: int
    default: 3
  - name: tier
    type: select
    options: [gold, silver]
dependencies:
  - name: core
    version: ^1.0
commands:
  - commands/review.md
output: .claude
"#;

    #[test]
    fn test_from_yaml_full() {
        let manifest = BundleManifest::from_yaml(FULL).unwrap();
        assert_eq!(manifest.display_name(), "linear-workflows");
        assert_eq!(manifest.flux.len(), 4);
        assert!(manifest.problems().is_empty());

        let schema = manifest.schema().unwrap();
        assert_eq!(schema.get("count").unwrap().kind, FluxType::Int);
        assert_eq!(schema.get("count").unwrap().default.as_deref(), Some("3"));
        assert_eq!(schema.get("tier").unwrap().options, vec!["gold", "silver"]);
        assert!(schema.get("org").unwrap().required);
    }

    #[test]
    fn test_problems_are_collected() {
        let manifest = BundleManifest::from_yaml(
            r"
version: one
requires: not-a-req
flux:
  - name: x
    type: number
dependencies:
  - name: ''
",
        )
        .unwrap();
        let problems = manifest.problems();
        assert_eq!(problems.len(), 5);
        assert!(problems[0].contains("'name'"));
        assert!(problems[1].contains("semantic version"));
        assert!(problems.iter().any(|p| p.contains("unknown type 'number'")));
    }

    #[test]
    fn test_validate_joins_problems() {
        let manifest = BundleManifest::from_yaml("name: x").unwrap();
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_check_requires() {
        let manifest = BundleManifest::from_yaml(FULL).unwrap();
        assert!(manifest.check_requires("0.3.0").is_ok());
        assert!(manifest.check_requires("0.2.9").is_err());
        assert!(BundleManifest::default().check_requires("0.1.0").is_ok());
    }

    #[test]
    fn test_referenced_files() {
        let manifest = BundleManifest::from_yaml(FULL).unwrap();
        let files: Vec<_> = manifest.referenced_files().collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "commands");
    }

    #[test]
    fn test_schema_reports_every_bad_declaration() {
        let manifest = BundleManifest::from_yaml(
            r"
flux:
  - name: a
    type: float
  - name: b
    type: map
",
        )
        .unwrap();
        let err = manifest.schema().unwrap_err().to_string();
        assert!(err.contains("'a'"));
        assert!(err.contains("'b'"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = BundleManifest::from_yaml("name: [unclosed").unwrap_err();
        assert!(matches!(
            err,
            crate::error::ForgeError::ManifestParseFailed { .. }
        ));
    }
}
