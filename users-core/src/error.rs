//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
///
/// Transport layers branch on the variant, never on the message text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Credentials did not match a stored user
    #[error("Unauthorized")]
    Unauthorized,

    /// No backend name was configured
    #[error("No database selected")]
    NoDatabaseSelected,

    /// The configured backend name has no registered implementation
    #[error("No database with name {0} registered")]
    DatabaseNotRegistered(String),

    /// A required user field is empty
    #[error("Error missing {0}")]
    MissingField(&'static str),

    /// An identifier does not match the backend's id format
    #[error("Invalid id format: {0}")]
    InvalidId(String),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Username is already registered
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Delete was asked for a collection the backend does not know
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Backend was used before `init` succeeded
    #[error("Database not initialized")]
    NotInitialized,

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether it is expected behavior (bad input, missing record, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Unauthorized
            | Self::MissingField(_)
            | Self::InvalidId(_)
            | Self::NotFound { .. }
            | Self::UsernameTaken(_)
            | Self::UnknownEntity(_) => true,
            Self::NoDatabaseSelected
            | Self::DatabaseNotRegistered(_)
            | Self::NotInitialized
            | Self::StorageError(_) => false,
        }
    }

    /// Configuration failures are fatal at startup and must not be retried.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoDatabaseSelected | Self::DatabaseNotRegistered(_)
        )
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
