use clap::Parser;
use std::path::PathBuf;

/// Arguments for the temper command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Check a bundle before publishing:\n    forge temper ./bundles/review\n\n\
                  Check a partial directory:\n    forge temper ./partials/standards")]
pub struct TemperArgs {
    /// Bundle or partial directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub bundle: PathBuf,
}
