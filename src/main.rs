//! nuvend - vendor pinned NuGet packages
//!
//! Reads a small declarative manifest of package sources and pinned package
//! versions, then downloads and unpacks every package that is missing or
//! outdated into its own folder under a local output root.

use clap::Parser;
use tracing::Level;

mod cli;
mod commands;
mod engine;
mod error;
mod feed;
mod manifest;
mod storage;
#[cfg(test)]
mod test_fixtures;
mod ui;
mod version;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(&cli.vendors, args),
        Commands::Check => commands::check::run(&cli.vendors),
        Commands::Status(args) => commands::status::run(&cli.vendors, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
