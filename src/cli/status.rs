use clap::Parser;
use std::path::PathBuf;

/// Arguments for the status command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Compare ./local with vendors.txt:\n    nuvend status\n\n\
                  Compare another folder:\n    nuvend status --folder third-party")]
pub struct StatusArgs {
    /// Output root to inspect
    #[arg(long, short = 'f', env = "NUVEND_FOLDER", default_value = "local")]
    pub folder: PathBuf,
}
