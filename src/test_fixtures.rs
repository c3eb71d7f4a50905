//! Test fixtures shared by unit tests: in-memory archives and a scripted
//! package repository.
//!
//! ```ignore
//! use crate::test_fixtures::{FakeRepository, nupkg};
//!
//! let repo = FakeRepository::new()
//!     .with_archive("Foo", "1.0.0", nupkg(&[("tools/install.ps1", "echo")]));
//! ```

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::Mutex;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{NuvendError, Result};
use crate::feed::PackageRepository;
use crate::version::PackageVersion;

/// Build a zip archive from `(entry name, content)` pairs, in order.
///
/// # Panics
///
/// Panics if the archive cannot be written.
#[must_use]
pub fn nupkg(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

/// A typical package: packaging parts, an install script and a nuspec
#[must_use]
pub fn standard_nupkg(package_id: &str) -> Vec<u8> {
    let nuspec = format!("{package_id}.nuspec");
    nupkg(&[
        ("_rels/.rels", "<Relationships/>"),
        ("[Content_Types].xml", "<Types/>"),
        ("tools/install.ps1", "Write-Host installed"),
        (nuspec.as_str(), "<package/>"),
    ])
}

/// Scripted [`PackageRepository`] serving archives from memory
#[derive(Default)]
pub struct FakeRepository {
    archives: HashMap<(String, String), Vec<u8>>,
    lookup_error: Option<String>,
    downloads: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `archive` for `package_id` at `version` (normalized on lookup)
    #[must_use]
    pub fn with_archive(mut self, package_id: &str, version: &str, archive: Vec<u8>) -> Self {
        self.archives.insert(key(package_id, version), archive);
        self
    }

    /// Make the version lookup fail with a feed error
    #[must_use]
    pub fn with_lookup_error(mut self, reason: &str) -> Self {
        self.lookup_error = Some(reason.to_string());
        self
    }

    /// `id version` for every archive handed out, in order
    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().expect("downloads lock").clone()
    }
}

fn key(package_id: &str, version: &str) -> (String, String) {
    let version = PackageVersion::parse(package_id, version)
        .map_or_else(|_| version.to_string(), |v| v.to_normalized_string());
    (package_id.to_lowercase(), version.to_lowercase())
}

impl PackageRepository for FakeRepository {
    fn all_versions(&self, package_id: &str) -> Result<Vec<String>> {
        if let Some(reason) = &self.lookup_error {
            return Err(NuvendError::FeedFailed {
                url: "memory://fake".to_string(),
                reason: reason.clone(),
            });
        }
        let id = package_id.to_lowercase();
        Ok(self
            .archives
            .keys()
            .filter(|(p, _)| *p == id)
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn copy_archive(
        &self,
        package_id: &str,
        version: &PackageVersion,
        sink: &mut dyn Write,
    ) -> Result<bool> {
        let normalized = version.to_normalized_string();
        let Some(archive) = self.archives.get(&key(package_id, &normalized)) else {
            return Ok(false);
        };
        sink.write_all(archive)?;
        self.downloads
            .lock()
            .expect("downloads lock")
            .push(format!("{package_id} {normalized}"));
        Ok(true)
    }
}
