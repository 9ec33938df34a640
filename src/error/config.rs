//! Manifest, schema and defaults file errors

use super::ForgeError;

/// Creates a manifest not found error
pub fn manifest_not_found(path: impl Into<String>) -> ForgeError {
    ForgeError::ManifestNotFound { path: path.into() }
}

/// Creates a manifest parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> ForgeError {
    ForgeError::ManifestParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid manifest error
pub fn invalid(message: impl Into<String>) -> ForgeError {
    ForgeError::ManifestInvalid {
        message: message.into(),
    }
}
