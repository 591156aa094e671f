//! In-memory backend.
//!
//! Used for tests and scratch trees. All data is ephemeral.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

use crate::error::{VfsError, VfsResult};
use crate::ops::StateFs;
use crate::types::{DirEntry, FileType};

/// Entry in the memory tree.
#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8> },
    Directory,
}

/// In-memory state filesystem.
///
/// Thread-safe via internal `RwLock`. The tree is seeded through
/// [`add_dir`](MemoryBackend::add_dir) and
/// [`add_file`](MemoryBackend::add_file) before handing the backend to
/// readers; browsing itself never mutates it.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(PathBuf::from(""), Entry::Directory);
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Normalize a path: remove leading `/`, resolve `.` and `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => {
                    result.push(s);
                }
            }
        }
        result
    }

    /// Add a directory, creating missing parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let normalized = Self::normalize(path.as_ref());
        let mut entries = self.entries.write().expect("lock poisoned");
        let mut current = PathBuf::new();
        for component in normalized.components() {
            if let Component::Normal(s) = component {
                current.push(s);
                entries.insert(current.clone(), Entry::Directory);
            }
        }
    }

    /// Add a file with the given contents, creating missing parents.
    pub fn add_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        let normalized = Self::normalize(path.as_ref());
        if let Some(parent) = normalized.parent() {
            self.add_dir(parent);
        }
        let mut entries = self.entries.write().expect("lock poisoned");
        entries.insert(normalized, Entry::File { data: data.into() });
    }

    fn path_str(path: &Path) -> String {
        path.display().to_string()
    }
}

#[async_trait]
impl StateFs for MemoryBackend {
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let normalized = Self::normalize(path);
        let entries = self
            .entries
            .read()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        // Verify the path is a directory
        if !normalized.as_os_str().is_empty() {
            match entries.get(&normalized) {
                Some(Entry::Directory) => {}
                Some(Entry::File { .. }) => {
                    return Err(VfsError::not_a_directory(Self::path_str(&normalized)));
                }
                None => {
                    return Err(VfsError::not_found(Self::path_str(&normalized)));
                }
            }
        }

        let mut result = Vec::new();
        for (entry_path, entry) in entries.iter() {
            if let Some(parent) = entry_path.parent() {
                if parent == normalized && entry_path != &normalized {
                    if let Some(name) = entry_path.file_name() {
                        let kind = match entry {
                            Entry::File { .. } => FileType::File,
                            Entry::Directory => FileType::Directory,
                        };
                        result.push(DirEntry {
                            name: name.to_string_lossy().into_owned(),
                            kind,
                        });
                    }
                }
            }
        }

        // Sort for consistent ordering
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = Self::normalize(path);
        let entries = self
            .entries
            .read()
            .map_err(|_| VfsError::other("lock poisoned"))?;

        match entries.get(&normalized) {
            Some(Entry::File { data }) => Ok(data.clone()),
            Some(Entry::Directory) => Err(VfsError::is_a_directory(Self::path_str(&normalized))),
            None => Err(VfsError::not_found(Self::path_str(&normalized))),
        }
    }
}
