//! SQLite-backed store using `SeaORM`.
//!
//! Customers, addresses and cards live in three tables. Attribute rows carry
//! a `customer_id` column pointing at their owner instead of the owner
//! holding a list of ids.

mod database;
pub(crate) mod entity;
mod migration;

use std::path::Path;

use sea_orm::{Database as SeaDatabase, DatabaseConnection, DbErr, SqlErr};
use sea_orm_migration::MigratorTrait;
use tokio::sync::OnceCell;

use users_core::error::{CoreError, CoreResult};

use migration::Migrator;

/// SQLite-backed `Database`.
///
/// Construction does no I/O. The connection pool is opened and the schema
/// migrated by `Database::init`; every other operation fails with
/// `CoreError::NotInitialized` until then.
pub struct SqliteStore {
    /// Connection URL, e.g. `sqlite://users.db?mode=rwc`
    url: String,
    /// Shared `SeaORM` connection pool, set once by `init`.
    pub(crate) db: OnceCell<DatabaseConnection>,
}

impl SqliteStore {
    /// Create a store for a `SeaORM` connection URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            db: OnceCell::new(),
        }
    }

    /// Create a store for a database file, creating its parent directory.
    ///
    /// The file itself is created on first connect.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if the directory cannot be created.
    pub fn at_path(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }
        Ok(Self::new(format!("sqlite://{}?mode=rwc", db_path.display())))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect and bring the schema up to date. Idempotent.
    async fn connect(&self) -> CoreResult<&DatabaseConnection> {
        self.db
            .get_or_try_init(|| async {
                let db = SeaDatabase::connect(&self.url).await.map_err(|e| {
                    CoreError::StorageError(format!("Failed to connect to SQLite: {e}"))
                })?;

                // Ensure schema is up to date before the store is used.
                Migrator::up(&db, None)
                    .await
                    .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

                log::info!("Connected to SQLite at {}", self.url);
                Ok(db)
            })
            .await
    }

    pub(crate) fn conn(&self) -> CoreResult<&DatabaseConnection> {
        self.db.get().ok_or(CoreError::NotInitialized)
    }
}

/// Map a write error, turning a username unique violation into
/// `CoreError::UsernameTaken`.
pub(crate) fn write_err(e: &DbErr, username: &str, action: &str) -> CoreError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CoreError::UsernameTaken(username.to_string()),
        _ => CoreError::StorageError(format!("Failed to {action}: {e}")),
    }
}
