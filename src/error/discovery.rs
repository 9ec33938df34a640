//! Discovery command errors

use super::ForgeError;

/// Creates a discovery command failure
pub fn failed(command: impl Into<String>, reason: impl Into<String>) -> ForgeError {
    ForgeError::DiscoveryFailed {
        command: command.into(),
        reason: reason.into(),
    }
}

/// Creates a discovery output parse failure
pub fn parse_failed(reason: impl Into<String>) -> ForgeError {
    ForgeError::DiscoveryParseFailed {
        reason: reason.into(),
    }
}
