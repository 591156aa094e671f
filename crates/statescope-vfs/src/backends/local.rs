//! Local directory tree backend.
//!
//! Exposes a host directory as a state backend, with path security to
//! prevent escaping the root.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{VfsError, VfsResult};
use crate::ops::StateFs;
use crate::types::{DirEntry, FileType};

/// Local filesystem backend.
///
/// All operations are relative to `root`. For example, if `root` is
/// `/srv/state`, then `read_all("prod/app.tfstate")` reads
/// `/srv/state/prod/app.tfstate`.
///
/// Attempts to escape the root via `..` or symlinks are blocked.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a local backend rooted at the given directory.
    ///
    /// The root is canonicalized at construction time to handle symlinks
    /// (e.g. macOS `/tmp` resolving to `/private/tmp`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical path to an absolute path within the root.
    ///
    /// Returns an error if the path does not exist or escapes the root.
    fn resolve(&self, path: &Path) -> VfsResult<PathBuf> {
        let relative = path.strip_prefix("/").unwrap_or(path);

        if relative.as_os_str().is_empty() {
            return Ok(self.root.clone());
        }

        let full = self.root.join(relative);

        // Canonicalize to resolve symlinks and `..`.
        let canonical = full.canonicalize().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VfsError::not_found(path.display().to_string())
            } else {
                VfsError::from(e)
            }
        })?;

        if !canonical.starts_with(&self.root) {
            return Err(VfsError::path_escapes_root(format!(
                "{} is not under {}",
                canonical.display(),
                self.root.display()
            )));
        }

        Ok(canonical)
    }
}

#[async_trait]
impl StateFs for LocalBackend {
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let full_path = self.resolve(path)?;

        let meta = fs::metadata(&full_path).await.map_err(VfsError::from)?;
        if !meta.is_dir() {
            return Err(VfsError::not_a_directory(path.display().to_string()));
        }

        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&full_path).await.map_err(VfsError::from)?;

        while let Some(entry) = dir.next_entry().await.map_err(VfsError::from)? {
            let file_type = entry.file_type().await.map_err(VfsError::from)?;
            let kind = if file_type.is_dir() {
                FileType::Directory
            } else if file_type.is_symlink() {
                FileType::Symlink
            } else {
                FileType::File
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let full_path = self.resolve(path)?;

        let meta = fs::metadata(&full_path).await.map_err(VfsError::from)?;
        if meta.is_dir() {
            return Err(VfsError::is_a_directory(path.display().to_string()));
        }

        fs::read(&full_path).await.map_err(VfsError::from)
    }
}
