//! Command implementations for Forge CLI

pub mod completions;
pub mod render;
pub mod temper;
pub mod version;
