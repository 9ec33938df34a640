//! Template parse and execution errors

use super::ForgeError;

/// Creates a template parse error
pub fn parse_failed(name: impl Into<String>, reason: impl Into<String>) -> ForgeError {
    ForgeError::TemplateParseFailed {
        name: name.into(),
        reason: reason.into(),
    }
}

/// Creates a template execution error
pub fn exec_failed(name: impl Into<String>, reason: impl Into<String>) -> ForgeError {
    ForgeError::TemplateExecFailed {
        name: name.into(),
        reason: reason.into(),
    }
}
