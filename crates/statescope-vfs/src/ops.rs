//! The state filesystem capability trait.

use async_trait::async_trait;
use std::path::Path;

use super::VfsResult;
use super::types::DirEntry;

/// Read-only browsing capability over a state backend.
///
/// All operations are path-based. Paths are logical, slash-separated, and
/// relative to the backend's root; a leading `/` and `.` components are
/// tolerated and normalized by implementations.
///
/// Implementations over different storage media (local directory tree,
/// object-storage bucket) are interchangeable: nothing above this trait
/// depends on which variant is in use.
#[async_trait]
pub trait StateFs: Send + Sync {
    /// Read directory entries.
    ///
    /// Returns the direct children of `path` (no recursion, no pagination).
    /// Fails with [`VfsError::NotFound`](super::VfsError::NotFound) or
    /// [`VfsError::NotADirectory`](super::VfsError::NotADirectory) when the
    /// path does not name a directory.
    async fn readdir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Read entire file contents.
    async fn read_all(&self, path: &Path) -> VfsResult<Vec<u8>>;
}
