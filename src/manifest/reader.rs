//! Line-by-line manifest reader

use std::io::BufRead;

use tracing::debug;

use super::grammar::{self, Declaration};
use super::ParsedManifest;
use crate::error::{Result, manifest};

/// Reads manifest text into a [`ParsedManifest`].
///
/// Blank lines and `#` comment lines are skipped. Any other line must be a
/// valid source or package declaration; the first one that is not aborts the
/// read with a parse error naming the line.
pub struct ManifestReader<R> {
    input: R,
}

impl<R: BufRead> ManifestReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    /// Consume the input and collect every declaration
    pub fn read(self) -> Result<ParsedManifest> {
        let mut parsed = ParsedManifest::default();

        for (index, line) in self.input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || grammar::is_comment(line) {
                continue;
            }

            match grammar::parse_line(line) {
                Some(Declaration::Source(source)) => {
                    debug!(name = %source.name, url = %source.url, "parsed source");
                    parsed.sources.push(source);
                }
                Some(Declaration::Package(package)) => {
                    debug!(
                        source = %package.source_name,
                        id = %package.package_id,
                        version = %package.package_version,
                        "parsed package"
                    );
                    parsed.packages.push(package);
                }
                None => return Err(manifest::parse_failed(index + 1, line)),
            }
        }

        Ok(parsed)
    }
}
