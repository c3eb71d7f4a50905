//! Common test utilities for nuvend integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Name of the local directory feed inside every test workspace
pub const FEED: &str = "feed";

/// A scratch project directory holding a manifest, a local feed and the
/// output root
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace with an empty feed folder
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        std::fs::create_dir_all(path.join(FEED)).expect("Failed to create feed directory");
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write `vendors.txt` with a `local` source pointing at the feed folder
    /// followed by `packages`, one declaration per line
    pub fn write_manifest(&self, packages: &[&str]) {
        let mut manifest = format!("# test manifest\nsource local {FEED}\n\n");
        for line in packages {
            manifest.push_str(line);
            manifest.push('\n');
        }
        self.write_file("vendors.txt", &manifest);
    }

    /// Publish a package archive to the flat feed layout
    pub fn publish(&self, package_id: &str, version: &str, entries: &[(&str, &str)]) {
        let bytes = nupkg(entries);
        let path = self
            .path
            .join(FEED)
            .join(format!("{package_id}.{version}.nupkg"));
        std::fs::write(path, bytes).expect("Failed to write package archive");
    }

    /// Publish a package with packaging parts, an install script and a nuspec
    pub fn publish_standard(&self, package_id: &str, version: &str) {
        let nuspec = format!("{package_id}.nuspec");
        let script = format!("Write-Host {package_id} {version}");
        self.publish(
            package_id,
            version,
            &[
                ("_rels/.rels", "<Relationships/>"),
                ("[Content_Types].xml", "<Types/>"),
                ("tools/install.ps1", script.as_str()),
                (nuspec.as_str(), "<package/>"),
            ],
        );
    }

    /// A nuvend command running in the workspace, isolated from the
    /// caller's environment
    pub fn cmd(&self) -> Command {
        let mut cmd = nuvend_cmd();
        cmd.current_dir(&self.path)
            .env_remove("NUVEND_VENDORS")
            .env_remove("NUVEND_FOLDER");
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn nuvend_cmd() -> Command {
    Command::cargo_bin("nuvend").expect("nuvend binary")
}

/// Build a zip archive from `(entry name, content)` pairs
pub fn nupkg(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
        assert!(workspace.file_exists(FEED));
    }

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_publish_writes_flat_feed() {
        let workspace = TestWorkspace::new();
        workspace.publish_standard("Foo.Bar", "1.0.0");
        assert!(workspace.file_exists("feed/Foo.Bar.1.0.0.nupkg"));
    }
}
