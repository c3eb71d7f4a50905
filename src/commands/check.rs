//! Check command: parse and validate the manifest

use std::path::Path;

use console::Style;

use super::load_manifest;
use crate::error::Result;
use crate::manifest::{Package, ParsedManifest};

/// Run check command
pub fn run(vendors: &Path) -> Result<()> {
    let manifest = load_manifest(vendors)?;
    print!("{}", describe(&manifest));
    Ok(())
}

fn package_options(package: &Package) -> String {
    let mut options = Vec::new();
    if package.output_folder != package.package_id {
        options.push(format!("into {}", package.output_folder));
    }
    if package.clean_on_update {
        options.push("clean".to_string());
    }
    options.join(" ")
}

fn describe(manifest: &ParsedManifest) -> String {
    let bold = Style::new().bold();
    let mut out = String::new();

    out.push_str(&format!("{}\n", bold.apply_to("Sources:")));
    for name in manifest.source_names() {
        if let Some(source) = manifest.source(name) {
            out.push_str(&format!(
                "  {} {}\n",
                Style::new().yellow().apply_to(&source.name),
                source.url
            ));
        }
    }

    out.push_str(&format!("{}\n", bold.apply_to("Packages:")));
    for package in &manifest.packages {
        let options = package_options(package);
        out.push_str(&format!(
            "  {} {} {}{}\n",
            Style::new().yellow().apply_to(&package.package_id),
            package.package_version,
            Style::new().dim().apply_to(format!("(from {})", package.source_name)),
            if options.is_empty() {
                String::new()
            } else {
                format!(" {options}")
            }
        ));
    }

    out.push_str(&format!(
        "\n{} source(s), {} package(s)\n",
        manifest.source_names().len(),
        manifest.packages.len()
    ));
    out
}
