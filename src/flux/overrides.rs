//! Explicit `dotted.key=value` overrides

use crate::error::{Result, flux::invalid_override};

/// A single user-supplied override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub key: String,
    pub value: String,
}

impl Override {
    /// Parse `dotted.key=value`. Splits on the first `=` only, so values may contain `=`.
    pub fn parse(input: &str) -> Result<Self> {
        let Some((key, value)) = input.split_once('=') else {
            return Err(invalid_override(input, "expected key=value"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid_override(input, "key cannot be empty"));
        }
        if key.split('.').any(str::is_empty) {
            return Err(invalid_override(input, "key has an empty path segment"));
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Parse every override, failing on the first malformed one
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Self>> {
        inputs.iter().map(|s| Self::parse(s.as_ref())).collect()
    }
}
