//! Variable override and validation errors

use super::ForgeError;

/// Creates an invalid override error
pub fn invalid_override(input: impl Into<String>, reason: impl Into<String>) -> ForgeError {
    ForgeError::InvalidOverride {
        input: input.into(),
        reason: reason.into(),
    }
}

/// Creates a validation error carrying every violation found
pub fn validation_failed(violations: Vec<String>) -> ForgeError {
    ForgeError::FluxValidationFailed { violations }
}
