//! Business logic service layer

mod user_service;

pub use user_service::CoreUserService;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{Address, Card, Health, User};

/// Service contract consumed by the transport layer.
///
/// Implemented by [`CoreUserService`] and by every middleware decorator, so
/// decorators can wrap each other in any order.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Verify credentials and return the stored user
    async fn login(&self, username: &str, password: &str) -> CoreResult<User>;

    /// Create a user from registration fields, returning the new ID
    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> CoreResult<String>;

    /// All users when `id` is empty, otherwise the single matching user
    async fn get_users(&self, id: &str) -> CoreResult<Vec<User>>;

    /// Create a user from a full record, returning the new ID
    async fn post_user(&self, user: User) -> CoreResult<String>;

    /// All addresses when `id` is empty, otherwise the single matching address
    async fn get_addresses(&self, id: &str) -> CoreResult<Vec<Address>>;

    /// Create an address owned by `user_id`, returning the new ID
    async fn post_address(&self, address: Address, user_id: &str) -> CoreResult<String>;

    /// All cards when `id` is empty, otherwise the single matching card
    async fn get_cards(&self, id: &str) -> CoreResult<Vec<Card>>;

    /// Create a card owned by `user_id`, returning the new ID
    async fn post_card(&self, card: Card, user_id: &str) -> CoreResult<String>;

    /// Delete an entity by collection name and ID
    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()>;

    /// Probe the service and its backend. Never fails.
    async fn health(&self) -> Vec<Health>;
}

macro_rules! forward_user_service {
    ($($pointer:ident),*) => {$(
        #[async_trait]
        impl<S: UserService + ?Sized> UserService for $pointer<S> {
            async fn login(&self, username: &str, password: &str) -> CoreResult<User> {
                (**self).login(username, password).await
            }

            async fn register(
                &self,
                username: &str,
                password: &str,
                email: &str,
                first_name: &str,
                last_name: &str,
            ) -> CoreResult<String> {
                (**self)
                    .register(username, password, email, first_name, last_name)
                    .await
            }

            async fn get_users(&self, id: &str) -> CoreResult<Vec<User>> {
                (**self).get_users(id).await
            }

            async fn post_user(&self, user: User) -> CoreResult<String> {
                (**self).post_user(user).await
            }

            async fn get_addresses(&self, id: &str) -> CoreResult<Vec<Address>> {
                (**self).get_addresses(id).await
            }

            async fn post_address(&self, address: Address, user_id: &str) -> CoreResult<String> {
                (**self).post_address(address, user_id).await
            }

            async fn get_cards(&self, id: &str) -> CoreResult<Vec<Card>> {
                (**self).get_cards(id).await
            }

            async fn post_card(&self, card: Card, user_id: &str) -> CoreResult<String> {
                (**self).post_card(card, user_id).await
            }

            async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
                (**self).delete(entity, id).await
            }

            async fn health(&self) -> Vec<Health> {
                (**self).health().await
            }
        }
    )*};
}

forward_user_service!(Box, Arc);
