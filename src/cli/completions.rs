use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Bash, loaded on every new shell:\n    \
                  nuvend completions bash > ~/.local/share/bash-completion/completions/nuvend\n\n\
                  Zsh, with ~/.zfunc on fpath:\n    nuvend completions zsh > ~/.zfunc/_nuvend\n\n\
                  PowerShell, for the current session:\n    \
                  nuvend completions powershell | Out-String | Invoke-Expression")]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
