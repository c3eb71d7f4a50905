//! CLI definitions using clap derive API
//!
//! Argument types of the larger commands live in submodules:
//! - sync: Sync command arguments
//! - status: Status command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod status;
pub mod sync;

pub use completions::CompletionsArgs;
pub use status::StatusArgs;
pub use sync::SyncArgs;

/// nuvend - vendor pinned NuGet packages
///
/// Downloads the packages pinned in a manifest and unpacks each into its own folder.
#[derive(Parser, Debug)]
#[command(
    name = "nuvend",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Vendor pinned NuGet packages into a local folder",
    long_about = "nuvend reads a manifest of package sources and pinned package versions, \
                  downloads every package that is missing or outdated and unpacks it into \
                  its own folder.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  nuvend sync                        \x1b[90m# Vendor packages from vendors.txt into ./local\x1b[0m\n   \
                  nuvend sync -f libs --force        \x1b[90m# Re-fetch everything into ./libs\x1b[0m\n   \
                  nuvend --vendors deps.txt check    \x1b[90m# Validate another manifest\x1b[0m\n   \
                  nuvend status                      \x1b[90m# Show which packages are outdated\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Manifest file declaring sources and packages
    #[arg(
        long,
        global = true,
        env = "NUVEND_VENDORS",
        default_value = "vendors.txt"
    )]
    pub vendors: PathBuf,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and unpack every missing or outdated package
    Sync(SyncArgs),

    /// Parse and validate the manifest without downloading anything
    Check,

    /// Compare installed versions with the manifest
    Status(StatusArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
