//! Forge - bundle renderer for AI coding assistant configuration
//!
//! Renders parameterised bundles of markdown commands, skills and rules into a
//! project: typed variables (flux) are layered and validated, documents are
//! rendered through a small template dialect with shared partials, and files
//! land wherever the bundle's output mapping sends them.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;
mod discovery;
mod domain;
mod error;
mod flux;
mod output;
mod partial;
mod progress;
mod prompt;
mod temper;
mod template;
#[cfg(test)]
mod test_fixtures;
mod ui;
mod writer;

use cli::{Cli, Commands};

/// Default filter: warnings only, or debug output for forge with `--verbose`.
/// `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "warn,forge=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Temper(args) => commands::temper::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
