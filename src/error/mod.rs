//! Error types and handling for nuvend
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Constructor helpers live in sub-modules by error domain:
//! - [`manifest`]: manifest parse and validation errors
//! - [`feed`]: package feed and download errors
//! - [`fs`]: file system and output folder errors

pub mod feed;
pub mod fs;
pub mod manifest;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for nuvend operations
#[derive(Error, Diagnostic, Debug)]
pub enum NuvendError {
    // Manifest errors
    #[error("Failed to parse manifest line {line_number}: '{line}'")]
    #[diagnostic(
        code(nuvend::manifest::parse_failed),
        help(
            "Expected 'source <name> <url>' or '<source> <package-id> <version> [into <folder>] [clean]'"
        )
    )]
    ManifestParse { line_number: usize, line: String },

    #[error("Invalid manifest:\n{message}")]
    #[diagnostic(
        code(nuvend::manifest::invalid),
        help("Declare every referenced source with 'source <name> <url>'")
    )]
    ManifestValidation { message: String },

    #[error("Invalid version '{version}' for package '{package_id}'")]
    #[diagnostic(
        code(nuvend::manifest::invalid_version),
        help("Versions look like 1.2.3, 1.0.0.12 or 3.5.5-patch-35246")
    )]
    InvalidVersion { package_id: String, version: String },

    #[error("Source '{name}' is not declared")]
    #[diagnostic(code(nuvend::manifest::unknown_source))]
    UnknownSource { name: String },

    // Feed errors
    #[error("Failed to download '{package_id}' {version} from '{source_name}': {reason}")]
    #[diagnostic(
        code(nuvend::feed::download_failed),
        help("Check that the package version exists on the source and that the source is reachable")
    )]
    DownloadFailed {
        package_id: String,
        version: String,
        source_name: String,
        reason: String,
    },

    #[error("Package feed '{url}' failed: {reason}")]
    #[diagnostic(code(nuvend::feed::request_failed))]
    FeedFailed { url: String, reason: String },

    #[error("Invalid package archive '{path}': {reason}")]
    #[diagnostic(code(nuvend::feed::invalid_archive))]
    ArchiveInvalid { path: String, reason: String },

    // File system errors
    #[error("Output folder does not exist: {path}")]
    #[diagnostic(code(nuvend::fs::missing_output_root))]
    MissingOutputRoot { path: String },

    #[error("Refusing to write outside of the output folder: {path}")]
    #[diagnostic(code(nuvend::fs::unsafe_path))]
    UnsafeEntryPath { path: String },

    #[error("File not found: {path}")]
    #[diagnostic(code(nuvend::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(nuvend::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(nuvend::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(nuvend::fs::io_error))]
    IoError { message: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(nuvend::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Run cancelled")]
    #[diagnostic(code(nuvend::engine::cancelled))]
    Cancelled,
}

impl From<std::io::Error> for NuvendError {
    fn from(err: std::io::Error) -> Self {
        NuvendError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for NuvendError {
    fn from(err: serde_json::Error) -> Self {
        NuvendError::IoError {
            message: format!("JSON error: {err}"),
        }
    }
}

impl From<zip::result::ZipError> for NuvendError {
    fn from(err: zip::result::ZipError) -> Self {
        NuvendError::ArchiveInvalid {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for NuvendError {
    fn from(err: reqwest::Error) -> Self {
        NuvendError::FeedFailed {
            url: err
                .url()
                .map_or_else(|| "unknown".to_string(), ToString::to_string),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, NuvendError>;
