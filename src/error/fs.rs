//! File system errors

use super::NuvendError;

/// Creates a missing output root error
pub fn missing_output_root(path: impl Into<String>) -> NuvendError {
    NuvendError::MissingOutputRoot { path: path.into() }
}

/// Creates an unsafe entry path error
pub fn unsafe_path(path: impl Into<String>) -> NuvendError {
    NuvendError::UnsafeEntryPath { path: path.into() }
}

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> NuvendError {
    NuvendError::FileNotFound { path: path.into() }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> NuvendError {
    NuvendError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> NuvendError {
    NuvendError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
