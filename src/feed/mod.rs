//! Package feeds
//!
//! A feed is where package archives come from. Each manifest [`Source`] is
//! opened once into a [`PackageRepository`] handle:
//!
//! - `http://` and `https://` urls are NuGet v3 feeds ([`HttpFeed`])
//! - `file://` urls and plain paths are local folders of `.nupkg` files ([`DirectoryFeed`])

mod directory;
mod http;

pub use directory::DirectoryFeed;
pub use http::{HttpFeed, USER_AGENT};

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::manifest::Source;
use crate::version::PackageVersion;

/// Repository collaborator used by the sync engine
pub trait PackageRepository: Send + Sync {
    /// Every version of `package_id` the feed knows about; empty when the
    /// package does not exist
    fn all_versions(&self, package_id: &str) -> Result<Vec<String>>;

    /// Stream the archive of one package version into `sink`.
    ///
    /// Returns `Ok(false)` when the feed has no such archive.
    fn copy_archive(
        &self,
        package_id: &str,
        version: &PackageVersion,
        sink: &mut dyn Write,
    ) -> Result<bool>;
}

/// Open the repository handle for a manifest source
pub fn open_repository(source: &Source) -> Result<Arc<dyn PackageRepository>> {
    let url = source.url.as_str();
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(Arc::new(HttpFeed::new(url)?));
    }
    let path = file_url_to_path(url).unwrap_or_else(|| PathBuf::from(url));
    Ok(Arc::new(DirectoryFeed::new(path)?))
}

fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file://")?;
    #[cfg(windows)]
    {
        if rest.len() >= 3 && rest.starts_with('/') && rest.as_bytes()[2] == b':' {
            return Some(PathBuf::from(&rest[1..]));
        }
    }
    Some(PathBuf::from(rest))
}
