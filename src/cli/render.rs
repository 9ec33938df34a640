use clap::Parser;
use std::path::PathBuf;

/// Arguments for the render command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Render into the current directory:\n    forge render ./bundles/review\n\n\
                  Render into a project with overrides:\n    forge render ./review --target ~/src/app --set org=acme --set linear.team=core\n\n\
                  Use a defaults file:\n    forge render ./review --defaults team.yaml\n\n\
                  Ask for missing values:\n    forge render ./review --interactive\n\n\
                  Show where files would go:\n    forge render ./review --dry-run")]
pub struct RenderArgs {
    /// Bundle directory containing forge.yaml
    pub bundle: PathBuf,

    /// Project directory to write into (defaults to current directory)
    #[arg(long, short = 't', env = "FORGE_TARGET")]
    pub target: Option<PathBuf>,

    /// Set a variable (dotted.key=value), may be repeated; later values win
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// YAML file with default variable values
    #[arg(long, short = 'd', env = "FORGE_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Extra directory to look up partials in, may be repeated
    #[arg(long = "partials-path", value_name = "DIR")]
    pub partials_path: Vec<PathBuf>,

    /// Prompt for variables that are still missing
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Print the planned file mapping without writing anything
    #[arg(long)]
    pub dry_run: bool,
}
