//! Output folder on the local file system

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{LocalBaseFolder, ReadSeek, components};
use crate::error::{Result, fs as fs_error};

/// A [`LocalBaseFolder`] rooted at an existing directory
#[derive(Debug, Clone)]
pub struct LocalFolder {
    root: PathBuf,
}

impl LocalFolder {
    /// Open an output root. The directory must already exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(fs_error::missing_output_root(root.display().to_string()));
        }
        let root = dunce::canonicalize(root)
            .map_err(|e| fs_error::read_failed(root.display().to_string(), e.to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut full = self.root.clone();
        for part in components(path)? {
            full.push(part);
        }
        Ok(full)
    }
}

impl LocalBaseFolder for LocalFolder {
    fn contains_folder(&self, name: &str) -> bool {
        self.resolve(name).is_ok_and(|p| p.is_dir())
    }

    fn read_file_or_empty(&self, path: &str) -> String {
        let Ok(full) = self.resolve(path) else {
            return String::new();
        };
        if !full.is_file() {
            return String::new();
        }
        match fs::read_to_string(&full) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %full.display(), error = %e, "could not read file, treating as empty");
                String::new()
            }
        }
    }

    fn open_for_writing(&self, path: &str) -> Result<Box<dyn Write + Send>> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                fs_error::write_failed(parent.display().to_string(), e.to_string())
            })?;
        }
        let file = File::create(&full)
            .map_err(|e| fs_error::write_failed(full.display().to_string(), e.to_string()))?;
        Ok(Box::new(file))
    }

    fn open_for_reading(&self, path: &str) -> Result<Box<dyn ReadSeek>> {
        let full = self.resolve(path)?;
        let file = File::open(&full)
            .map_err(|e| fs_error::read_failed(full.display().to_string(), e.to_string()))?;
        Ok(Box::new(file))
    }

    fn clean(&self, folder: &str, keep: &[&str]) -> Result<()> {
        let base = self.resolve(folder)?;
        if !base.is_dir() {
            return Ok(());
        }
        let keep: Vec<PathBuf> = keep
            .iter()
            .map(|k| components(k).map(|parts| parts.into_iter().collect::<PathBuf>()))
            .collect::<Result<_>>()?;

        for entry in WalkDir::new(&base).min_depth(1).contents_first(true) {
            let entry = entry
                .map_err(|e| fs_error::read_failed(base.display().to_string(), e.to_string()))?;
            let rel = entry.path().strip_prefix(&base).unwrap_or(entry.path());

            if entry.file_type().is_dir() {
                if keep.iter().any(|k| k.starts_with(rel)) {
                    continue;
                }
                fs::remove_dir(entry.path()).map_err(|e| {
                    fs_error::write_failed(entry.path().display().to_string(), e.to_string())
                })?;
            } else if !keep.iter().any(|k| k == rel) {
                fs::remove_file(entry.path()).map_err(|e| {
                    fs_error::write_failed(entry.path().display().to_string(), e.to_string())
                })?;
            }
        }
        debug!(folder = %base.display(), kept = keep.len(), "cleaned folder");
        Ok(())
    }
}
