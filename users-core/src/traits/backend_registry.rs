//! Storage backend registry

use std::collections::HashMap;
use std::sync::Arc;

use super::Database;
use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;

/// Name → backend mapping, populated at startup.
///
/// Registering a name that is already present replaces the earlier backend.
/// The registry is consumed by nothing at runtime: [`BackendRegistry::select`]
/// resolves the active backend into a [`Storage`] that the service owns.
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn Database>>,
}

impl BackendRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under `name`, replacing any earlier registration.
    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn Database>) {
        let name = name.into();
        if self.backends.insert(name.clone(), backend).is_some() {
            tracing::warn!(backend = %name, "Replacing previously registered database backend");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Registered backend names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get a registered backend without initializing it
    pub fn get(&self, name: &str) -> Option<Arc<dyn Database>> {
        self.backends.get(name).cloned()
    }

    /// Resolve `name` to the active backend and initialize it.
    ///
    /// # Errors
    /// - `CoreError::NoDatabaseSelected` if `name` is empty
    /// - `CoreError::DatabaseNotRegistered` if nothing is registered under `name`
    /// - the backend's own error if `init` fails
    pub async fn select(&self, name: &str, link_domain: &str) -> CoreResult<Storage> {
        if name.is_empty() {
            return Err(CoreError::NoDatabaseSelected);
        }
        let backend = self
            .get(name)
            .ok_or_else(|| CoreError::DatabaseNotRegistered(name.to_string()))?;

        backend.init().await?;
        tracing::info!(backend = %name, "Database backend selected");

        Ok(Storage::new(name, backend, link_domain))
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.names())
            .finish()
    }
}
