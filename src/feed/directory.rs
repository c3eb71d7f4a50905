//! Local folder feed
//!
//! Holds `.nupkg` archives either flat (`<id>.<version>.nupkg`) or in the
//! hierarchical layout written by `nuget add` (`<id>/<version>/<id>.<version>.nupkg`).
//! File and folder names are matched case-insensitively.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::PackageRepository;
use crate::error::{Result, feed, fs as fs_error};
use crate::version::{ARCHIVE_EXTENSION, PackageVersion};

/// A feed backed by a local directory
#[derive(Debug, Clone)]
pub struct DirectoryFeed {
    root: PathBuf,
}

impl DirectoryFeed {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(feed::request_failed(
                root.display().to_string(),
                "feed directory does not exist",
            ));
        }
        Ok(Self { root })
    }

    /// Every `(version text, archive path)` pair for `package_id`
    fn archives(&self, package_id: &str) -> Result<Vec<(String, PathBuf)>> {
        let id = package_id.to_lowercase();
        let prefix = format!("{id}.");
        let suffix = format!(".{ARCHIVE_EXTENSION}");
        let mut found = Vec::new();

        for (name, path) in list_dir(&self.root)? {
            let lower = name.to_lowercase();
            if path.is_file() {
                if let Some(version) = lower
                    .strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(&suffix))
                    .filter(|v| PackageVersion::parse(package_id, v).is_ok())
                {
                    found.push((version.to_string(), path));
                }
            } else if path.is_dir() && lower == id {
                for (version, version_dir) in list_dir(&path)? {
                    let expected = format!("{id}.{}{suffix}", version.to_lowercase());
                    if let Some((_, archive)) = list_dir(&version_dir)?
                        .into_iter()
                        .find(|(file, _)| file.to_lowercase() == expected)
                    {
                        found.push((version, archive));
                    }
                }
            }
        }
        Ok(found)
    }
}

fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir)
        .map_err(|e| fs_error::read_failed(dir.display().to_string(), e.to_string()))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry?;
        out.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    out.sort();
    Ok(out)
}

impl PackageRepository for DirectoryFeed {
    fn all_versions(&self, package_id: &str) -> Result<Vec<String>> {
        Ok(self
            .archives(package_id)?
            .into_iter()
            .map(|(version, _)| version)
            .collect())
    }

    fn copy_archive(
        &self,
        package_id: &str,
        version: &PackageVersion,
        sink: &mut dyn Write,
    ) -> Result<bool> {
        let wanted = version.to_normalized_string();
        let archive = self.archives(package_id)?.into_iter().find(|(text, _)| {
            PackageVersion::parse(package_id, text)
                .is_ok_and(|v| v.to_normalized_string().eq_ignore_ascii_case(&wanted))
        });
        let Some((_, path)) = archive else {
            debug!(feed = %self.root.display(), package_id, version = %wanted, "archive not found");
            return Ok(false);
        };

        let mut file = File::open(&path)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
        let bytes = io::copy(&mut file, sink)?;
        debug!(archive = %path.display(), bytes, "archive copied");
        Ok(true)
    }
}
