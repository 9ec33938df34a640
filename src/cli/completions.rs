use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    forge completions bash > ~/.bash_completion.d/forge\n\n\
                  Generate zsh completions:\n    forge completions zsh > ~/.zfunc/_forge\n\n\
                  Generate fish completions:\n    forge completions fish > ~/.config/fish/completions/forge.fish\n\n\
                  Generate PowerShell completions:\n    forge completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
