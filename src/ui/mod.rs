//! Terminal presentation layer
//!
//! Formatting of diagnostics, render plans and temper reports lives here so
//! the core modules only ever produce structured records.

pub mod display;

pub use display::{
    diagnostic_line, display_plan, display_temper_report, print_diagnostics, summary_line,
};
