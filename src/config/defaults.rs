//! Defaults file loading
//!
//! A defaults file is a YAML mapping of variable values, e.g.
//!
//! ```yaml
//! org: acme
//! linear:
//!   team: ENG
//! ```

use std::path::Path;

use serde_yaml::Value as YamlValue;

use crate::error::{Result, config::invalid};
use crate::flux::Context;

/// Load a defaults file into a context
pub fn load_defaults(path: &Path) -> Result<Context> {
    let value: YamlValue = super::read_yaml(path)?;
    match value {
        YamlValue::Mapping(_) => Ok(Context::from_yaml(&value)),
        YamlValue::Null => Ok(Context::new()),
        _ => Err(invalid(format!(
            "defaults file {} must contain a mapping",
            path.display()
        ))),
    }
}
