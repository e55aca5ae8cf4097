//! Storage backend abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Address, Card, User};

/// Storage backend Trait
///
/// Backend implementations:
/// - `users-store`: `MemoryStore` (in-process document store)
/// - `users-store`: `SqliteStore` (`SeaORM`)
///
/// Identifiers are opaque strings assigned by the backend. A backend rejects
/// ids that do not match its own format with `CoreError::InvalidId` and
/// missing records with `CoreError::NotFound`.
#[async_trait]
pub trait Database: Send + Sync {
    /// Connect and prepare the backend. Called once when the backend is selected.
    async fn init(&self) -> CoreResult<()>;

    /// Get a user by unique username
    async fn get_user_by_name(&self, name: &str) -> CoreResult<User>;

    /// Get a user by ID
    ///
    /// The returned user carries its owned addresses and cards as id-only
    /// entries; use [`Database::get_user_attributes`] to resolve them.
    async fn get_user(&self, id: &str) -> CoreResult<User>;

    /// Get all users
    async fn get_users(&self) -> CoreResult<Vec<User>>;

    /// Persist a new user and any embedded addresses and cards
    ///
    /// Assigns ids to the user and its attributes. Rejects a username that is
    /// already taken.
    async fn create_user(&self, user: &mut User) -> CoreResult<()>;

    /// Replace the user's id-only attribute entries with the stored records
    async fn get_user_attributes(&self, user: &mut User) -> CoreResult<()>;

    /// Get an address by ID
    async fn get_address(&self, id: &str) -> CoreResult<Address>;

    /// Get all addresses
    async fn get_addresses(&self) -> CoreResult<Vec<Address>>;

    /// Persist a new address owned by `user_id`
    async fn create_address(&self, address: &mut Address, user_id: &str) -> CoreResult<()>;

    /// Get a card by ID
    async fn get_card(&self, id: &str) -> CoreResult<Card>;

    /// Get all cards
    async fn get_cards(&self) -> CoreResult<Vec<Card>>;

    /// Persist a new card owned by `user_id`
    async fn create_card(&self, card: &mut Card, user_id: &str) -> CoreResult<()>;

    /// Delete an entity by collection name and ID
    ///
    /// Deleting a `customers` entity also removes its addresses and cards.
    /// Deleting an address or card drops it from its owner's references.
    /// Unknown collection names fail with `CoreError::UnknownEntity`.
    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()>;

    /// Check backend connectivity
    async fn ping(&self) -> CoreResult<()>;
}
