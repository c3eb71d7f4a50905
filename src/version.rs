//! Package versions and identities
//!
//! Versions follow the NuGet shape `N(.N){0,3}(-label(.label)*)?(+metadata)?`.
//! The manifest keeps the version text as written; the sync engine compares
//! and names archives by the normalized [`PackageVersion::to_full_string`].

use std::fmt;

use crate::error::{Result, manifest};

/// A parsed package version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageVersion {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    release: Vec<String>,
    metadata: Option<String>,
}

impl PackageVersion {
    /// Parse a version string, `package_id` only feeds the error message
    pub fn parse(package_id: &str, text: &str) -> Result<Self> {
        parse_parts(text.trim()).ok_or_else(|| manifest::invalid_version(package_id, text))
    }

    /// Normalized version with release labels and metadata.
    ///
    /// At least three numeric components are printed; the fourth only when
    /// it is non-zero.
    pub fn to_full_string(&self) -> String {
        let mut out = self.to_normalized_string();
        if let Some(metadata) = &self.metadata {
            out.push('+');
            out.push_str(metadata);
        }
        out
    }

    /// Normalized version without build metadata
    pub fn to_normalized_string(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if self.revision > 0 {
            out.push_str(&format!(".{}", self.revision));
        }
        if !self.release.is_empty() {
            out.push('-');
            out.push_str(&self.release.join("."));
        }
        out
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_full_string())
    }
}

fn parse_parts(text: &str) -> Option<PackageVersion> {
    let (text, metadata) = match text.split_once('+') {
        Some((rest, meta)) if is_label(meta) => (rest, Some(meta.to_string())),
        Some(_) => return None,
        None => (text, None),
    };
    let (numbers, release) = match text.split_once('-') {
        Some((numbers, release)) if is_label(release) => (numbers, release),
        Some(_) => return None,
        None => (text, ""),
    };

    let components = numbers
        .split('.')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                part.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<u64>>>()?;
    if components.is_empty() || components.len() > 4 {
        return None;
    }
    let component = |i: usize| components.get(i).copied().unwrap_or(0);

    Some(PackageVersion {
        major: component(0),
        minor: component(1),
        patch: component(2),
        revision: component(3),
        release: if release.is_empty() {
            Vec::new()
        } else {
            release.split('.').map(str::to_string).collect()
        },
        metadata,
    })
}

/// Dot separated, non-empty identifiers of `[0-9A-Za-z-]`
fn is_label(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Package id plus parsed version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    pub id: String,
    pub version: PackageVersion,
}

impl PackageIdentity {
    pub fn parse(id: &str, version: &str) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            version: PackageVersion::parse(id, version)?,
        })
    }

    /// Archive file name, `<id>.<version>.nupkg`
    pub fn archive_file_name(&self) -> String {
        format!("{self}.{ARCHIVE_EXTENSION}")
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.version.to_normalized_string())
    }
}

/// Extension of downloaded package archives
pub const ARCHIVE_EXTENSION: &str = "nupkg";
