//! Command implementations for nuvend CLI

pub mod check;
pub mod completions;
pub mod status;
pub mod sync;
pub mod version;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::{NuvendError, Result, fs as fs_error};
use crate::manifest::{ManifestReader, ParsedManifest};

/// Read and validate the manifest at `path`
pub(crate) fn load_manifest(path: &Path) -> Result<ParsedManifest> {
    if !path.is_file() {
        return Err(fs_error::not_found(path.display().to_string()));
    }
    let file = File::open(path)
        .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
    let manifest = ManifestReader::new(BufReader::new(file)).read()?;
    manifest.validate()?;
    debug!(
        path = %path.display(),
        sources = manifest.sources.len(),
        packages = manifest.packages.len(),
        "manifest loaded"
    );
    Ok(manifest)
}

/// Make sure the output root exists as a directory
pub(crate) fn ensure_output_root(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(NuvendError::ConfigInvalid {
            message: format!("output folder '{}' is not a directory", path.display()),
        });
    }
    fs::create_dir_all(path)
        .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))
}
