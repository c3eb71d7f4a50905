use clap::Parser;
use std::path::PathBuf;

/// Arguments for the sync command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Vendor into ./local:\n    nuvend sync\n\n\
                  Vendor into another folder:\n    nuvend sync --folder third-party\n\n\
                  Ignore version markers and fetch everything again:\n    nuvend sync --force\n\n\
                  Plain line output for CI logs:\n    nuvend sync --plain")]
pub struct SyncArgs {
    /// Output root; every package gets its own folder below it
    #[arg(long, short = 'f', env = "NUVEND_FOLDER", default_value = "local")]
    pub folder: PathBuf,

    /// Fetch every package even when its version marker is current
    #[arg(long)]
    pub force: bool,

    /// Print one line per finished package instead of progress bars
    #[arg(long)]
    pub plain: bool,
}
