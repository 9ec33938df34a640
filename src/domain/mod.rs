//! Domain models for Forge
//!
//! This module contains pure domain objects representing the resolved shape of
//! a bundle: typed flux variables, discovery specs, resolved output files and
//! the diagnostics produced along the way.

pub mod diagnostic;
pub mod file;
pub mod flux;

pub use diagnostic::{Diagnostic, Severity};
pub use file::ResolvedFile;
pub use flux::{DiscoverySpec, FluxSchema, FluxType, FluxVariable, PromptKind};
