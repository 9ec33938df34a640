//! Separate flux schema file (flux.yaml)

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::bundle::{BundleManifest, FluxDeclaration, schema_from_declarations};
use crate::domain::FluxSchema;
use crate::error::Result;

/// Contents of flux.yaml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub flux: Vec<FluxDeclaration>,
}

impl SchemaFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        super::parse_yaml(yaml, "flux.yaml")
    }

    /// Load the schema file in `dir`, if there is one
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        super::find_schema(dir)
            .map(|path| super::read_yaml(&path))
            .transpose()
    }

    pub fn schema(&self) -> Result<FluxSchema> {
        schema_from_declarations(&self.flux)
    }
}

/// Schema used at render time: the schema file wins over the manifest's `flux`
pub fn effective_schema(
    manifest: &BundleManifest,
    schema_file: Option<&SchemaFile>,
) -> Result<FluxSchema> {
    match schema_file {
        Some(file) => file.schema(),
        None => manifest.schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{create_bundle, create_temp_dir};

    #[test]
    fn test_schema_file_wins_over_manifest() {
        let manifest = BundleManifest::from_yaml(
            "name: x\nversion: 1.0.0\nflux:\n  - name: from_manifest\n",
        )
        .unwrap();
        let file = SchemaFile::from_yaml("flux:\n  - name: from_schema\n    type: bool\n").unwrap();

        let schema = effective_schema(&manifest, Some(&file)).unwrap();
        assert!(schema.get("from_schema").is_some());
        assert!(schema.get("from_manifest").is_none());

        let schema = effective_schema(&manifest, None).unwrap();
        assert!(schema.get("from_manifest").is_some());
    }

    #[test]
    fn test_load_absent_schema_file() {
        let temp = create_temp_dir();
        assert!(SchemaFile::load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_schema_file() {
        let bundle = create_bundle(&[("flux.yml", "flux:\n  - name: org\n    required: true\n")]);
        let file = SchemaFile::load(bundle.path()).unwrap().unwrap();
        assert_eq!(file.flux.len(), 1);
        assert!(file.schema().unwrap().get("org").unwrap().required);
    }
}
