//! Status command: compare version markers with the manifest
//!
//! Works offline; no source is contacted.

use std::path::Path;

use console::Style;

use super::load_manifest;
use crate::cli::StatusArgs;
use crate::engine::VersionMarker;
use crate::error::Result;
use crate::manifest::Package;
use crate::storage::{LocalBaseFolder, LocalFolder};
use crate::version::PackageVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    UpToDate,
    Outdated { installed: String },
    Missing,
}

/// Installed state of one package
pub fn package_status(storage: &dyn LocalBaseFolder, package: &Package) -> Result<PackageStatus> {
    let pinned = PackageVersion::parse(&package.package_id, &package.package_version)?;
    if !storage.contains_folder(&package.output_folder) {
        return Ok(PackageStatus::Missing);
    }
    Ok(match VersionMarker::read(storage, &package.output_folder) {
        Some(marker) if marker.version == pinned.to_full_string() => PackageStatus::UpToDate,
        Some(marker) => PackageStatus::Outdated {
            installed: marker.version,
        },
        None => PackageStatus::Missing,
    })
}

/// Run status command
pub fn run(vendors: &Path, args: StatusArgs) -> Result<()> {
    let manifest = load_manifest(vendors)?;
    let storage = if args.folder.is_dir() {
        Some(LocalFolder::new(&args.folder)?)
    } else {
        None
    };

    let width = manifest
        .packages
        .iter()
        .map(|p| p.package_id.chars().count())
        .max()
        .unwrap_or(0);

    let mut pending = 0;
    for package in &manifest.packages {
        let status = match &storage {
            Some(storage) => package_status(storage, package)?,
            None => PackageStatus::Missing,
        };
        let label = match &status {
            PackageStatus::UpToDate => Style::new().green().apply_to("up to date".to_string()),
            PackageStatus::Outdated { installed } => {
                pending += 1;
                Style::new()
                    .yellow()
                    .apply_to(format!("outdated (installed {installed})"))
            }
            PackageStatus::Missing => {
                pending += 1;
                Style::new().red().apply_to("missing".to_string())
            }
        };
        println!(
            "  {:<width$}  {:<12} {}",
            package.package_id, package.package_version, label
        );
    }

    println!();
    if pending == 0 {
        println!("{}", Style::new().green().apply_to("Everything is vendored"));
    } else {
        println!("{pending} package(s) need a sync");
    }
    Ok(())
}
