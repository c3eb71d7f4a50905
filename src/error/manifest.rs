//! Manifest errors

use super::NuvendError;

/// Creates a parse error for one manifest line (1-based line number)
pub fn parse_failed(line_number: usize, line: impl Into<String>) -> NuvendError {
    NuvendError::ManifestParse {
        line_number,
        line: line.into(),
    }
}

/// Creates a validation error carrying every violation
pub fn validation_failed(message: impl Into<String>) -> NuvendError {
    NuvendError::ManifestValidation {
        message: message.into(),
    }
}

/// Creates an invalid version error
pub fn invalid_version(package_id: impl Into<String>, version: impl Into<String>) -> NuvendError {
    NuvendError::InvalidVersion {
        package_id: package_id.into(),
        version: version.into(),
    }
}

/// Creates an unknown source error
pub fn unknown_source(name: impl Into<String>) -> NuvendError {
    NuvendError::UnknownSource { name: name.into() }
}
