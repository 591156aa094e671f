//! Search error taxonomy.

use statescope_vfs::VfsError;
use thiserror::Error;

/// Error type for one search operation.
///
/// Only [`SearchError::DirectoryRead`] is ever returned to callers: a
/// failed listing aborts the whole operation. State-file load failures are
/// observed via `tracing` and degrade to an empty result instead, so "no
/// state file" and "malformed state file" are indistinguishable successes.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The requested path could not be listed.
    #[error("could not read path contents of {path}: {source}")]
    DirectoryRead {
        /// The logical path that failed to list.
        path: String,
        source: VfsError,
    },

    /// The candidate state file could not be fetched or decoded.
    #[error("could not load state file {path}: {source}")]
    StateParse {
        /// The logical path of the candidate file.
        path: String,
        source: StateLoadError,
    },
}

/// Why a candidate state file failed to load.
#[derive(Debug, Error)]
pub enum StateLoadError {
    /// Fetching the file from the backend failed.
    #[error(transparent)]
    Fetch(#[from] VfsError),

    /// The file contents did not parse as a state document.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}
