//! Version command implementation

use std::io::{self, Write};

use crate::engine::MARKER_FILE;
use crate::error::Result;
use crate::feed::USER_AGENT;

/// Run version command
pub fn run() -> Result<()> {
    write_info(&mut io::stdout().lock())?;
    Ok(())
}

fn write_info(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "nuvend {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "{}", env!("CARGO_PKG_DESCRIPTION"))?;
    writeln!(out)?;
    writeln!(out, "Vendoring:")?;
    writeln!(out, "  Feeds: NuGet v3 over http(s), local .nupkg folders")?;
    writeln!(out, "  Version marker: {MARKER_FILE}")?;
    writeln!(out, "  User agent: {USER_AGENT}")?;
    writeln!(out)?;
    writeln!(out, "Build info:")?;
    writeln!(out, "  Minimum Rust version: {}", env!("CARGO_PKG_RUST_VERSION"))?;
    writeln!(out, "  Profile: {}", build_profile())?;
    Ok(())
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
