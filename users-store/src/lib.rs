//! # users-store
//!
//! Storage backends for the Users account service. Each backend implements
//! [`users_core::Database`] and is registered with a
//! [`users_core::BackendRegistry`] under a fixed name.
//!
//! ## Feature Flags
//!
//! | Backend | Feature Flag | Registry Name |
//! |---------|-------------|---------------|
//! | In-process document store | `memory` | `memory` |
//! | SQLite via `SeaORM` | `sqlite` | `sqlite` |
//!
//! - **`all-backends`** *(default)*: enable every backend listed above.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use users_core::BackendRegistry;
//! use users_store::{register_backends, StoreConfig};
//!
//! # async fn run() -> users_core::CoreResult<()> {
//! let mut registry = BackendRegistry::new();
//! register_backends(&mut registry, &StoreConfig::default());
//! let _storage = registry.select("memory", "localhost:8080").await?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "memory", feature = "sqlite"))]
use std::sync::Arc;

use users_core::traits::BackendRegistry;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Registry name of the in-process document store.
pub const MEMORY_BACKEND: &str = "memory";
/// Registry name of the SQLite store.
pub const SQLITE_BACKEND: &str = "sqlite";

/// Default SQLite connection URL, relative to the working directory.
pub const DEFAULT_SQLITE_URL: &str = "sqlite://users.db?mode=rwc";

/// Settings the shipped backends need at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `SeaORM` connection URL for the SQLite backend
    pub sqlite_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_url: DEFAULT_SQLITE_URL.to_string(),
        }
    }
}

/// Registers every backend enabled via feature flags.
///
/// Backends are only constructed here; no connection is made until the
/// registry selects one.
#[cfg_attr(not(feature = "sqlite"), allow(unused_variables))]
pub fn register_backends(registry: &mut BackendRegistry, config: &StoreConfig) {
    #[cfg(feature = "memory")]
    registry.register(MEMORY_BACKEND, Arc::new(MemoryStore::new()));
    #[cfg(feature = "sqlite")]
    registry.register(SQLITE_BACKEND, Arc::new(SqliteStore::new(&config.sqlite_url)));

    log::debug!("Registered storage backends: {:?}", available_backends());
}

/// Names of the backends enabled via feature flags.
pub fn available_backends() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "memory")]
        MEMORY_BACKEND,
        #[cfg(feature = "sqlite")]
        SQLITE_BACKEND,
    ]
}
