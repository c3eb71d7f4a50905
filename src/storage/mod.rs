//! Storage for vendored packages
//!
//! The sync engine never touches the file system directly. It talks to a
//! [`LocalBaseFolder`], which stores named byte streams under one output root.
//! Paths handed to it are relative and `/`-separated, for example
//! `Foo.Bar/lib/net45/Foo.Bar.dll`.

mod local;
#[cfg(test)]
pub mod memory;

pub use local::LocalFolder;

use std::io::{Read, Seek, Write};

use crate::error::{Result, fs};

/// Readable and seekable byte source, as needed to open zip archives
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Storage collaborator used by the sync engine.
///
/// Implementations may be called concurrently from several source-group
/// workers, each working on its own output folders.
pub trait LocalBaseFolder: Send + Sync {
    /// Whether a top-level folder with this exact name exists
    fn contains_folder(&self, name: &str) -> bool;

    /// File content as text, or an empty string when absent or unreadable
    fn read_file_or_empty(&self, path: &str) -> String;

    /// Open a file for writing, creating parent folders and replacing any
    /// existing content
    fn open_for_writing(&self, path: &str) -> Result<Box<dyn Write + Send>>;

    /// Open an existing file for reading
    fn open_for_reading(&self, path: &str) -> Result<Box<dyn ReadSeek>>;

    /// Remove the contents of `folder` except the relative paths in `keep`.
    /// The folder itself may remain.
    fn clean(&self, folder: &str, keep: &[&str]) -> Result<()>;
}

/// Join a folder and a relative path with `/`
pub fn join(folder: &str, path: &str) -> String {
    if folder.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", folder.trim_end_matches('/'), path)
    }
}

/// Split a relative storage path into its normal components.
///
/// Both `/` and `\` separate components. Empty and `.` components are
/// dropped; absolute paths, drive prefixes and `..` are rejected. On Windows
/// a `:` anywhere is rejected as well.
pub fn components(path: &str) -> Result<Vec<&str>> {
    if path.starts_with('/') || path.starts_with('\\') || has_drive_prefix(path) {
        return Err(fs::unsafe_path(path));
    }
    if cfg!(windows) && path.contains(':') {
        return Err(fs::unsafe_path(path));
    }
    let mut parts = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => return Err(fs::unsafe_path(path)),
            part => parts.push(part),
        }
    }
    if parts.is_empty() {
        return Err(fs::unsafe_path(path));
    }
    Ok(parts)
}

/// `C:`, `C:\x` or the drive-relative `C:x`
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
