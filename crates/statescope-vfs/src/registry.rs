//! Ordered registry of named state backends.

use std::sync::Arc;

use super::ops::StateFs;

struct Backend {
    name: String,
    fs: Arc<dyn StateFs>,
}

/// An ordered collection of named backends.
///
/// Built once at startup and shared read-only for the lifetime of the
/// process. Names are returned in registration order. Duplicate names are
/// permitted; lookup resolves to the first registration with that name.
#[derive(Default)]
pub struct BackendList {
    backends: Vec<Backend>,
}

impl std::fmt::Debug for BackendList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendList")
            .field("names", &self.names())
            .finish()
    }
}

impl BackendList {
    /// Create a new empty backend list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named backend.
    pub fn add(&mut self, name: impl Into<String>, fs: Arc<dyn StateFs>) {
        self.backends.push(Backend {
            name: name.into(),
            fs,
        });
    }

    /// Look up a backend by name. First registration wins.
    pub fn get(&self, name: &str) -> Option<Arc<dyn StateFs>> {
        self.backends
            .iter()
            .find(|b| b.name == name)
            .map(|b| Arc::clone(&b.fs))
    }

    /// All backend names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name.as_str()).collect()
    }

    /// Returns true if no backends are registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }
}
