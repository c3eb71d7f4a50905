//! Vendor manifest model
//!
//! A manifest is a line-oriented text file declaring package sources and the
//! packages pinned from them:
//!
//! ```text
//! # sources
//! source proget https://proget.example/nuget/feed/
//! source nuget https://api.nuget.org/v3/index.json
//!
//! # packages
//! proget Foo.Bar 1.0.0.12
//! nuget RavenDB.Server 3.5.5-patch-35246 into RavenDB-3.5 clean
//! ```
//!
//! Reading a manifest never validates it; call [`ParsedManifest::validate`]
//! before handing it to the sync engine.

mod grammar;
mod reader;


pub use reader::ManifestReader;

use std::collections::HashSet;

use crate::error::{Result, manifest};

/// A named package repository endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    pub name: String,
    pub url: String,
}

/// One pinned package declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Package {
    /// Name of the [`Source`] the package is fetched from
    pub source_name: String,
    pub package_id: String,
    /// Version exactly as written in the manifest
    pub package_version: String,
    /// Destination directory under the vendoring root (defaults to the package id)
    pub output_folder: String,
    /// Purge the output folder before extracting a new version
    pub clean_on_update: bool,
}

impl Package {
    /// Create a package declaration with the default output folder
    #[cfg(test)]
    pub fn new(
        source_name: impl Into<String>,
        package_id: impl Into<String>,
        package_version: impl Into<String>,
    ) -> Self {
        let package_id = package_id.into();
        Self {
            source_name: source_name.into(),
            output_folder: package_id.clone(),
            package_id,
            package_version: package_version.into(),
            clean_on_update: false,
        }
    }
}

/// All declarations of a manifest, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub sources: Vec<Source>,
    pub packages: Vec<Package>,
}

impl ParsedManifest {
    /// Parse a whole manifest held in memory
    #[cfg(test)]
    pub fn parse(text: &str) -> Result<Self> {
        ManifestReader::new(text.as_bytes()).read()
    }

    /// Look up a source by name; the last declaration wins on duplicates
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().rev().find(|s| s.name == name)
    }

    /// Source names in declaration order, duplicates removed
    pub fn source_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sources
            .iter()
            .map(|s| s.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Check that every package references a declared source.
    ///
    /// All violations are collected into one error, followed by the list of
    /// known source names.
    pub fn validate(&self) -> Result<()> {
        let errors = self.errors();
        if errors.is_empty() {
            return Ok(());
        }
        Err(manifest::validation_failed(errors.join("\n")))
    }

    fn errors(&self) -> Vec<String> {
        let known: HashSet<&str> = self.sources.iter().map(|s| s.name.as_str()).collect();
        let mut errors: Vec<String> = self
            .packages
            .iter()
            .filter(|p| !known.contains(p.source_name.as_str()))
            .map(|p| {
                format!(
                    "missing source '{}' referenced by '{}'",
                    p.source_name, p.package_id
                )
            })
            .collect();

        if !errors.is_empty() {
            errors.push(format!("known sources: {}", self.source_names().join(", ")));
        }
        errors
    }
}
