//! Temper command implementation
//!
//! Validates a bundle or partial directory and prints every finding. Exits
//! with status 1 when any finding is an error.

use tracing::debug;

use crate::cli::TemperArgs;
use crate::error::{Result, config::manifest_not_found};
use crate::temper;
use crate::ui;

/// Run the temper command
pub fn run(args: TemperArgs) -> Result<()> {
    if !args.bundle.is_dir() {
        return Err(manifest_not_found(args.bundle.display().to_string()));
    }

    let report = temper::run(&args.bundle);
    ui::display_temper_report(&report);
    debug!(has_errors = report.has_errors(), "temper report printed");

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
