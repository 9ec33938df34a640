//! Error types and handling for Forge
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Manifest, schema and defaults file errors
//! - [`flux`]: Variable override and validation errors
//! - [`template`]: Template parse and execution errors
//! - [`partial`]: Partial lookup and cycle errors
//! - [`output`]: Output mapping errors
//! - [`discovery`]: External discovery command errors
//! - [`fs`]: File system errors

pub mod config;
pub mod discovery;
pub mod flux;
pub mod fs;
pub mod output;
pub mod partial;
pub mod template;


use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Forge operations
#[derive(Error, Diagnostic, Debug)]
pub enum ForgeError {
    // Configuration errors
    #[error("Manifest not found in: {path}")]
    #[diagnostic(
        code(forge::config::manifest_not_found),
        help("A bundle directory must contain forge.yaml (or partial.yaml for a partial)")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to parse {path}: {reason}")]
    #[diagnostic(code(forge::config::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(forge::config::invalid))]
    ManifestInvalid { message: String },

    // Flux errors
    #[error("Invalid override '{input}': {reason}")]
    #[diagnostic(
        code(forge::flux::invalid_override),
        help("Overrides use the form dotted.key=value")
    )]
    InvalidOverride { input: String, reason: String },

    #[error("Variable validation failed:\n  {}", .violations.join("\n  "))]
    #[diagnostic(
        code(forge::flux::validation_failed),
        help("Supply missing values with --set name=value or a --defaults file")
    )]
    FluxValidationFailed { violations: Vec<String> },

    // Template errors
    #[error("Template parse error in {name}: {reason}")]
    #[diagnostic(code(forge::template::parse_failed))]
    TemplateParseFailed { name: String, reason: String },

    #[error("Template execution failed in {name}: {reason}")]
    #[diagnostic(code(forge::template::exec_failed))]
    TemplateExecFailed { name: String, reason: String },

    // Partial errors
    #[error("Partial '{name}' not found")]
    #[diagnostic(
        code(forge::partial::not_found),
        help("Partials are looked up in the bundle's partials/ directory and --partials-path roots")
    )]
    PartialNotFound { name: String },

    #[error("Circular partial reference detected: {chain}")]
    #[diagnostic(
        code(forge::partial::circular),
        help("Remove the partial reference that leads back to itself")
    )]
    CircularPartial { chain: String },

    // Output errors
    #[error("Output source not found: {path}")]
    #[diagnostic(
        code(forge::output::missing_source),
        help("Every key of the output mapping must name a file or directory in the bundle")
    )]
    MissingOutputSource { path: String },

    // Discovery errors
    #[error("Discovery command failed: {command}: {reason}")]
    #[diagnostic(code(forge::discovery::failed))]
    DiscoveryFailed { command: String, reason: String },

    #[error("Failed to parse discovery output: {reason}")]
    #[diagnostic(code(forge::discovery::parse_failed))]
    DiscoveryParseFailed { reason: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(forge::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(forge::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(forge::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(forge::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ForgeError {
    fn from(err: serde_yaml::Error) -> Self {
        ForgeError::ManifestParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::DiscoveryParseFailed {
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for ForgeError {
    fn from(err: inquire::InquireError) -> Self {
        ForgeError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, ForgeError>;
