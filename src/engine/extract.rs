//! Unpacking a downloaded `.nupkg` into its output folder

use std::io;

use percent_encoding::percent_decode_str;
use tracing::{debug, trace};
use zip::ZipArchive;

use crate::error::{Result, feed};
use crate::storage::{self, LocalBaseFolder};

/// Packaging metadata folder, never extracted
const RELATIONSHIPS_PREFIX: &str = "_rels";
/// Packaging content-types part, never extracted
const CONTENT_TYPES_FILE: &str = "[Content_Types].xml";

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;

/// One archive entry with its name percent-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full path inside the archive
    pub path: String,
    /// Last path segment
    pub name: String,
    pub is_dir: bool,
}

impl ArchiveEntry {
    pub fn new(raw_name: &str, is_dir: bool) -> Self {
        let path = percent_decode_str(raw_name).decode_utf8_lossy().into_owned();
        let name = path.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
        Self { path, name, is_dir }
    }

    /// Packaging metadata and directory entries are skipped
    pub fn should_extract(&self) -> bool {
        !self.is_dir
            && !self.path.starts_with(RELATIONSHIPS_PREFIX)
            && self.name != CONTENT_TYPES_FILE
    }
}

/// Whether unix mode bits describe a directory. Archives written on Windows
/// carry the DOS directory attribute, which shows up here as `S_IFDIR`.
fn is_directory_mode(mode: Option<u32>) -> bool {
    mode.is_some_and(|m| m & S_IFMT == S_IFDIR)
}

/// Compared without case, as the output folder may live on a
/// case-insensitive file system
fn is_same_path(path: &str, parts: &[&str]) -> bool {
    storage::components(path).is_ok_and(|candidate| {
        candidate.len() == parts.len()
            && candidate
                .iter()
                .zip(parts)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Extract the archive at `archive_path` into `folder`.
///
/// `on_entry` is called for every entry in archive order, extracted or not,
/// with the decoded entry path, its 0-based index and the entry count.
/// An entry that would land on the archive itself is skipped, so the
/// downloaded copy stays intact while it is being read.
/// Returns how many files were written.
pub fn extract_archive(
    storage: &dyn LocalBaseFolder,
    archive_path: &str,
    folder: &str,
    mut on_entry: impl FnMut(&str, usize, usize),
) -> Result<usize> {
    let archive_parts = storage::components(archive_path)?;
    let reader = storage.open_for_reading(archive_path)?;
    let mut archive =
        ZipArchive::new(reader).map_err(|e| feed::invalid_archive(archive_path, e.to_string()))?;

    let total = archive.len();
    let mut written = 0;
    for index in 0..total {
        let mut file = archive
            .by_index(index)
            .map_err(|e| feed::invalid_archive(archive_path, e.to_string()))?;
        let is_dir = file.is_dir() || is_directory_mode(file.unix_mode());
        let entry = ArchiveEntry::new(file.name(), is_dir);
        on_entry(&entry.path, index, total);

        if !entry.should_extract() {
            trace!(entry = %entry.path, "skipping archive entry");
            continue;
        }

        let target = storage::join(folder, &entry.path);
        if is_same_path(&target, &archive_parts) {
            trace!(entry = %entry.path, "entry shadows the downloaded archive, skipping");
            continue;
        }

        let mut out = storage.open_for_writing(&target)?;
        io::copy(&mut file, &mut out)?;
        written += 1;
    }
    debug!(archive = %archive_path, total, written, "archive extracted");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use crate::storage::LocalFolder;
    use crate::storage::memory::MemoryFolder;
    use crate::test_fixtures::nupkg;

    /// Rewrite the central directory record of `name` as if a DOS tool had
    /// written it with the directory attribute set
    fn mark_dos_directory(archive: &mut [u8], name: &str) {
        const CENTRAL_HEADER: &[u8] = b"PK\x01\x02";
        let mut pos = 0;
        while let Some(offset) = archive[pos..]
            .windows(CENTRAL_HEADER.len())
            .position(|w| w == CENTRAL_HEADER)
        {
            let start = pos + offset;
            let name_len = u16::from_le_bytes([archive[start + 28], archive[start + 29]]) as usize;
            if &archive[start + 46..start + 46 + name_len] == name.as_bytes() {
                // version made by, high byte 0 = MS-DOS
                archive[start + 5] = 0;
                archive[start + 38..start + 42].copy_from_slice(&0x10u32.to_le_bytes());
                return;
            }
            pos = start + CENTRAL_HEADER.len();
        }
        panic!("no central directory record for '{name}'");
    }

    #[test]
    fn test_entry_names_are_percent_decoded() {
        let entry = ArchiveEntry::new("content/my%20file%2Bextra.txt", false);
        assert_eq!(entry.path, "content/my file+extra.txt");
        assert_eq!(entry.name, "my file+extra.txt");
    }

    #[test]
    fn test_packaging_entries_are_skipped() {
        assert!(!ArchiveEntry::new("_rels/.rels", false).should_extract());
        assert!(!ArchiveEntry::new("[Content_Types].xml", false).should_extract());
        assert!(!ArchiveEntry::new("%5BContent_Types%5D.xml", false).should_extract());
        assert!(!ArchiveEntry::new("lib/", true).should_extract());
        assert!(ArchiveEntry::new("tools/install.ps1", false).should_extract());
        assert!(ArchiveEntry::new("Foo.nuspec", false).should_extract());
    }

    #[test]
    fn test_directory_mode() {
        assert!(is_directory_mode(Some(0o040755)));
        assert!(!is_directory_mode(Some(0o100644)));
        assert!(!is_directory_mode(None));
    }

    #[test]
    fn test_extract_archive() {
        let storage = MemoryFolder::new();
        storage.insert(
            "Foo/Foo.1.0.0.nupkg",
            nupkg(&[
                ("_rels/.rels", "rels"),
                ("[Content_Types].xml", "types"),
                ("tools/install.ps1", "Write-Host hi"),
                ("content/a%20b.txt", "spaced"),
            ]),
        );

        let mut seen = Vec::new();
        let written = extract_archive(&storage, "Foo/Foo.1.0.0.nupkg", "Foo", |path, i, total| {
            seen.push((path.to_string(), i, total));
        })
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            seen,
            vec![
                ("_rels/.rels".to_string(), 0, 4),
                ("[Content_Types].xml".to_string(), 1, 4),
                ("tools/install.ps1".to_string(), 2, 4),
                ("content/a b.txt".to_string(), 3, 4),
            ]
        );
        assert_eq!(
            storage.read_file_or_empty("Foo/tools/install.ps1"),
            "Write-Host hi"
        );
        assert_eq!(storage.read_file_or_empty("Foo/content/a b.txt"), "spaced");
        assert!(!storage.contains_path("Foo/_rels/.rels"));
        assert!(!storage.contains_path("Foo/[Content_Types].xml"));
    }

    #[test]
    fn test_invalid_archive() {
        let storage = MemoryFolder::new();
        storage.insert("Foo/Foo.1.0.0.nupkg", "not a zip");
        let err = extract_archive(&storage, "Foo/Foo.1.0.0.nupkg", "Foo", |_, _, _| {})
            .unwrap_err();
        assert!(matches!(err, crate::error::NuvendError::ArchiveInvalid { .. }));
    }

    #[test]
    fn test_entry_escaping_the_folder_is_rejected() {
        let storage = MemoryFolder::new();
        storage.insert("Foo/Foo.1.0.0.nupkg", nupkg(&[("..%2F..%2Fevil.txt", "x")]));
        let err = extract_archive(&storage, "Foo/Foo.1.0.0.nupkg", "Foo", |_, _, _| {})
            .unwrap_err();
        assert!(matches!(err, crate::error::NuvendError::UnsafeEntryPath { .. }));
    }

    #[test]
    fn test_directory_entries_are_not_written() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("content/", options).unwrap();
        zip.add_directory("lib/net45", options).unwrap();
        zip.start_file("lib/net45/Foo.dll", options).unwrap();
        zip.write_all(b"dll").unwrap();
        let archive = zip.finish().unwrap().into_inner();

        let storage = MemoryFolder::new();
        storage.insert("Foo/Foo.1.0.0.nupkg", archive);
        let mut seen = Vec::new();
        let written = extract_archive(&storage, "Foo/Foo.1.0.0.nupkg", "Foo", |path, _, _| {
            seen.push(path.to_string());
        })
        .unwrap();

        assert_eq!(seen, ["content/", "lib/net45/", "lib/net45/Foo.dll"]);
        assert_eq!(written, 1);
        assert_eq!(
            storage.paths(),
            ["Foo/Foo.1.0.0.nupkg", "Foo/lib/net45/Foo.dll"]
        );
    }

    #[test]
    fn test_dos_directory_attribute_without_trailing_slash() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.start_file("assets", options).unwrap();
        zip.start_file("tools/install.ps1", options).unwrap();
        zip.write_all(b"Write-Host hi").unwrap();
        let mut archive = zip.finish().unwrap().into_inner();
        mark_dos_directory(&mut archive, "assets");

        let storage = MemoryFolder::new();
        storage.insert("Foo/Foo.1.0.0.nupkg", archive);
        let written =
            extract_archive(&storage, "Foo/Foo.1.0.0.nupkg", "Foo", |_, _, _| {}).unwrap();

        assert_eq!(written, 1);
        assert!(!storage.contains_path("Foo/assets"));
        assert!(storage.contains_path("Foo/tools/install.ps1"));
    }

    #[test]
    fn test_entry_named_like_the_archive_keeps_the_download() {
        let temp = TempDir::new().unwrap();
        let storage = LocalFolder::new(temp.path()).unwrap();
        let archive = nupkg(&[("Foo.1.0.0.nupkg", "inner"), ("tools/install.ps1", "x")]);
        storage
            .open_for_writing("Foo/Foo.1.0.0.nupkg")
            .unwrap()
            .write_all(&archive)
            .unwrap();

        let written =
            extract_archive(&storage, "Foo/Foo.1.0.0.nupkg", "Foo", |_, _, _| {}).unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read(temp.path().join("Foo/Foo.1.0.0.nupkg")).unwrap(),
            archive
        );
        assert_eq!(
            std::fs::read_to_string(temp.path().join("Foo/tools/install.ps1")).unwrap(),
            "x"
        );
    }

    #[test]
    fn test_archive_path_match_ignores_case() {
        let parts = ["Foo", "Foo.1.0.0.nupkg"];
        assert!(is_same_path("Foo/foo.1.0.0.NUPKG", &parts));
        assert!(is_same_path("Foo//Foo.1.0.0.nupkg", &parts));
        assert!(!is_same_path("Foo/content/Foo.1.0.0.nupkg", &parts));
    }
}
