//! Installed-version marker kept inside every output folder

use std::io::Write;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::storage::{self, LocalBaseFolder};

/// File name of the marker, relative to the package's output folder
pub const MARKER_FILE: &str = "vendor.dependency.description.json";

/// `{"Version": "<full version>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionMarker {
    #[serde(alias = "version")]
    pub version: String,
}

impl VersionMarker {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn path(folder: &str) -> String {
        storage::join(folder, MARKER_FILE)
    }

    /// Read the marker of `folder`.
    ///
    /// Returns `None` when the marker is missing or blank. A marker that is
    /// not valid JSON is logged and also reads as `None`, so the package is
    /// fetched again.
    pub fn read(storage: &dyn LocalBaseFolder, folder: &str) -> Option<Self> {
        let path = Self::path(folder);
        let content = storage.read_file_or_empty(&path);
        if content.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&content) {
            Ok(marker) => Some(marker),
            Err(e) => {
                warn!(path = %path, error = %e, "ignoring unreadable version marker");
                None
            }
        }
    }

    /// Replace the marker of `folder`
    pub fn write(&self, storage: &dyn LocalBaseFolder, folder: &str) -> Result<()> {
        let mut writer = storage.open_for_writing(&Self::path(folder))?;
        writer.write_all(&serde_json::to_vec_pretty(self)?)?;
        writer.flush()?;
        Ok(())
    }
}
