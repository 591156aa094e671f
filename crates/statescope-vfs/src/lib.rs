//! Read-only virtual filesystem abstraction for state backends.
//!
//! A state backend is a browsable tree of infrastructure state files. This
//! crate provides the uniform capability the rest of statescope consumes:
//!
//! - [`StateFs`] - Core trait for read-only filesystem operations
//! - [`BackendList`] - Ordered registry of named backends
//! - [`LocalBackend`] - Local directory tree (with path security)
//! - [`MemoryBackend`] - In-memory tree (for testing and scratch data)
//!
//! ## Design Decisions
//!
//! - **Path-based**: Operations take logical slash-separated paths relative
//!   to the backend's root. No inodes, no handles.
//! - **Read-only**: Browsing never mutates a backend. Adapters over media
//!   that could be written to simply do not expose write operations.
//! - **Interchangeable backends**: Callers never branch on which concrete
//!   backend is behind the trait object.

pub mod backends;
mod error;
mod ops;
mod registry;
mod types;

pub use backends::{LocalBackend, MemoryBackend};
pub use error::{VfsError, VfsResult};
pub use ops::StateFs;
pub use registry::BackendList;
pub use types::{DirEntry, FileType};
