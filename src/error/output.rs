//! Output mapping errors

use super::ForgeError;

/// Creates a missing output source error
pub fn missing_source(path: impl Into<String>) -> ForgeError {
    ForgeError::MissingOutputSource { path: path.into() }
}
