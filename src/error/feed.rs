//! Package feed errors

use super::NuvendError;

/// Creates a download failure error
pub fn download_failed(
    package_id: impl Into<String>,
    version: impl Into<String>,
    source_name: impl Into<String>,
    reason: impl Into<String>,
) -> NuvendError {
    NuvendError::DownloadFailed {
        package_id: package_id.into(),
        version: version.into(),
        source_name: source_name.into(),
        reason: reason.into(),
    }
}

/// Creates a feed request failure error
pub fn request_failed(url: impl Into<String>, reason: impl Into<String>) -> NuvendError {
    NuvendError::FeedFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid archive error
pub fn invalid_archive(path: impl Into<String>, reason: impl Into<String>) -> NuvendError {
    NuvendError::ArchiveInvalid {
        path: path.into(),
        reason: reason.into(),
    }
}
