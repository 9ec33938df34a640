//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - render: Render command arguments
//! - temper: Temper command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod completions;
pub mod render;
pub mod temper;

pub use completions::CompletionsArgs;
pub use render::RenderArgs;
pub use temper::TemperArgs;

/// Forge - bundle renderer for AI coding assistant configuration
///
/// Render parameterised bundles of commands, skills and rules into a project.
#[derive(Parser, Debug)]
#[command(
    name = "forge",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Render configuration bundles for AI coding assistants",
    long_about = "Forge renders bundles of markdown commands, skills and rules into a project. \
                  Bundles declare typed variables (flux), share text through partials, and map \
                  their files onto the layout each assistant expects.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  forge render ./review --set org=acme     \x1b[90m# Render with an override\x1b[0m\n   \
                  forge render ./review -i                 \x1b[90m# Prompt for missing values\x1b[0m\n   \
                  forge render ./review --dry-run          \x1b[90m# Show the file mapping\x1b[0m\n   \
                  forge temper ./review                    \x1b[90m# Validate before publishing\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a bundle into a project
    Render(RenderArgs),

    /// Validate a bundle or partial without rendering
    Temper(TemperArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
