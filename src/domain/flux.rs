//! Flux variable domain types
//!
//! A flux variable is a named, typed, optionally-defaulted input consumed by
//! templates. Declarations come from `forge.yaml` or a separate `flux.yaml`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Allowed values for a variable's `type` field
pub const FLUX_TYPES: &[&str] = &["string", "bool", "int", "list", "select"];

/// Declared type of a flux variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FluxType {
    #[default]
    String,
    Bool,
    Int,
    List,
    Select,
}

impl FromStr for FluxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(FluxType::String),
            "bool" => Ok(FluxType::Bool),
            "int" => Ok(FluxType::Int),
            "list" => Ok(FluxType::List),
            "select" => Ok(FluxType::Select),
            other => Err(format!(
                "unknown type '{other}' (expected one of: {})",
                FLUX_TYPES.join(", ")
            )),
        }
    }
}

impl fmt::Display for FluxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FluxType::String => "string",
            FluxType::Bool => "bool",
            FluxType::Int => "int",
            FluxType::List => "list",
            FluxType::Select => "select",
        };
        f.write_str(name)
    }
}

/// How discovered options are presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Select,
    Multiselect,
}

/// External command that enumerates candidate values for a variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySpec {
    /// Command template, may reference context paths (e.g. `gh api orgs/{{org}}/teams`)
    pub command: String,

    /// Template applied to the command's JSON output to produce `label|value` lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse: Option<String>,

    #[serde(default)]
    pub prompt: PromptKind,

    /// Auxiliary variable name -> position among the extra output fields (0 = third segment)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub also_sets: BTreeMap<String, usize>,
}

/// A declared flux variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluxVariable {
    /// Dotted path (e.g., "linear.team")
    pub name: String,
    pub kind: FluxType,
    pub required: bool,
    pub default: Option<String>,
    pub options: Vec<String>,
    pub prompt: Option<String>,
    pub discover: Option<DiscoverySpec>,
}

impl FluxVariable {
    /// Create a plain optional string variable
    pub fn new(name: impl Into<String>, kind: FluxType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            options: Vec::new(),
            prompt: None,
            discover: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Default value, if one is declared and non-empty
    pub fn non_empty_default(&self) -> Option<&str> {
        self.default.as_deref().filter(|d| !d.is_empty())
    }
}

/// Ordered set of declared variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FluxSchema {
    pub variables: Vec<FluxVariable>,
}

impl FluxSchema {
    pub fn new(variables: Vec<FluxVariable>) -> Self {
        Self { variables }
    }

    pub fn get(&self, name: &str) -> Option<&FluxVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FluxVariable> {
        self.variables.iter()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
