//! In-memory output folder for engine tests

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{LocalBaseFolder, ReadSeek, components};
use crate::error::{Result, fs};

#[derive(Default)]
struct State {
    files: BTreeMap<String, Vec<u8>>,
    writes: HashMap<String, usize>,
}

/// A [`LocalBaseFolder`] keeping files in a map keyed by normalized path.
///
/// Written content becomes visible when the writer is dropped.
#[derive(Clone, Default)]
pub struct MemoryFolder {
    state: Arc<Mutex<State>>,
}

impl MemoryFolder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn key(path: &str) -> Result<String> {
        Ok(components(path)?.join("/"))
    }

    /// Whether a file exists at `path`
    pub fn contains_path(&self, path: &str) -> bool {
        Self::key(path).is_ok_and(|k| self.lock().files.contains_key(&k))
    }

    /// Store a file directly, bypassing the writer
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) {
        let key = Self::key(path).unwrap_or_else(|_| path.to_string());
        self.lock().files.insert(key, content.into());
    }

    /// Raw file content
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        let key = Self::key(path).ok()?;
        self.lock().files.get(&key).cloned()
    }

    /// All stored paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    /// How many times `path` was opened for writing
    pub fn write_count(&self, path: &str) -> usize {
        Self::key(path)
            .ok()
            .and_then(|k| self.lock().writes.get(&k).copied())
            .unwrap_or(0)
    }
}

impl LocalBaseFolder for MemoryFolder {
    fn contains_folder(&self, name: &str) -> bool {
        let Ok(prefix) = Self::key(name) else {
            return false;
        };
        let prefix = format!("{prefix}/");
        self.lock().files.keys().any(|k| k.starts_with(&prefix))
    }

    fn read_file_or_empty(&self, path: &str) -> String {
        self.content(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    }

    fn open_for_writing(&self, path: &str) -> Result<Box<dyn Write + Send>> {
        let key = Self::key(path)?;
        *self.lock().writes.entry(key.clone()).or_default() += 1;
        Ok(Box::new(MemoryWriter {
            state: Arc::clone(&self.state),
            key,
            buffer: Vec::new(),
        }))
    }

    fn open_for_reading(&self, path: &str) -> Result<Box<dyn ReadSeek>> {
        let bytes = self.content(path).ok_or_else(|| fs::not_found(path))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn clean(&self, folder: &str, keep: &[&str]) -> Result<()> {
        let prefix = format!("{}/", Self::key(folder)?);
        let keep: Vec<String> = keep
            .iter()
            .map(|k| Self::key(k).map(|k| format!("{prefix}{k}")))
            .collect::<Result<_>>()?;
        self.lock()
            .files
            .retain(|k, _| !k.starts_with(&prefix) || keep.contains(k));
        Ok(())
    }
}

struct MemoryWriter {
    state: Arc<Mutex<State>>,
    key: String,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        let content = std::mem::take(&mut self.buffer);
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .files
            .insert(std::mem::take(&mut self.key), content);
    }
}
