//! BundleDependency struct for bundle manifests
//!
//! A dependency declaration in forge.yaml

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::error::{Result, config::invalid};

/// A dependency declaration in forge.yaml
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BundleDependency {
    /// Dependency name
    #[serde(default)]
    pub name: String,

    /// Semantic version requirement (e.g., "^1.2")
    #[serde(
        default,
        deserialize_with = "crate::config::scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
}

impl BundleDependency {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Validate dependency
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("Dependency name cannot be empty"));
        }

        if let Some(version) = &self.version {
            VersionReq::parse(version).map_err(|e| {
                invalid(format!(
                    "Dependency '{}' has an invalid version requirement '{version}': {e}",
                    self.name
                ))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_validate_ok() {
        assert!(BundleDependency::new("core", "^1.2").validate().is_ok());
        assert!(
            BundleDependency {
                name: "core".to_string(),
                version: None
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_dependency_validate_empty_name() {
        let err = BundleDependency::new("", "1").validate().unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[test]
    fn test_dependency_validate_bad_requirement() {
        let err = BundleDependency::new("core", "one point two")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("core"));
        assert!(err.to_string().contains("one point two"));
    }
}
