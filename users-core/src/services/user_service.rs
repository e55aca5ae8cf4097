//! Core user service
//!
//! Authentication, registration and attribute CRUD over the active storage
//! backend. Cross-cutting concerns live in the middleware decorators.

use std::sync::Arc;

use async_trait::async_trait;

use super::UserService;
use crate::crypto::{calculate_pass_hash, verify_password};
use crate::error::{CoreError, CoreResult};
use crate::storage::Storage;
use crate::types::{Address, Card, Health, User, STATUS_ERR, STATUS_OK};

/// Component name reported for the service process in health probes.
pub const APP_COMPONENT: &str = "user";
/// Component name reported for the storage backend in health probes.
pub const DB_COMPONENT: &str = "user-db";

/// Business logic service
pub struct CoreUserService {
    storage: Arc<Storage>,
}

impl CoreUserService {
    /// Create a service over the selected storage backend
    #[must_use]
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    async fn create_user(&self, mut user: User) -> CoreResult<String> {
        user.id.clear();
        self.storage.create_user(&mut user).await?;
        Ok(user.id)
    }
}

#[async_trait]
impl UserService for CoreUserService {
    async fn login(&self, username: &str, password: &str) -> CoreResult<User> {
        let mut user = match self.storage.get_user_by_name(username).await {
            Ok(user) => user,
            Err(CoreError::NotFound { .. }) => return Err(CoreError::Unauthorized),
            Err(e) => return Err(e),
        };
        if !verify_password(password, &user.salt, &user.password) {
            return Err(CoreError::Unauthorized);
        }
        self.storage.get_user_attributes(&mut user).await?;
        user.mask_cards();
        Ok(user)
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> CoreResult<String> {
        let mut user = User::new();
        user.username = username.to_string();
        user.password = password.to_string();
        user.email = email.to_string();
        user.first_name = first_name.to_string();
        user.last_name = last_name.to_string();
        user.validate()?;

        user.password = calculate_pass_hash(password, &user.salt);
        self.create_user(user).await
    }

    async fn get_users(&self, id: &str) -> CoreResult<Vec<User>> {
        if id.is_empty() {
            return self.storage.get_users().await;
        }
        let mut user = self.storage.get_user(id).await?;
        self.storage.get_user_attributes(&mut user).await?;
        Ok(vec![user])
    }

    async fn post_user(&self, mut user: User) -> CoreResult<String> {
        user.validate()?;
        // Always re-hash: the direct-write path bypasses `register`.
        let plain = std::mem::take(&mut user.password);
        user.set_password(&plain);
        self.create_user(user).await
    }

    async fn get_addresses(&self, id: &str) -> CoreResult<Vec<Address>> {
        if id.is_empty() {
            return self.storage.get_addresses().await;
        }
        Ok(vec![self.storage.get_address(id).await?])
    }

    async fn post_address(&self, mut address: Address, user_id: &str) -> CoreResult<String> {
        if user_id.is_empty() {
            return Err(CoreError::MissingField("UserID"));
        }
        address.id.clear();
        self.storage.create_address(&mut address, user_id).await?;
        Ok(address.id)
    }

    async fn get_cards(&self, id: &str) -> CoreResult<Vec<Card>> {
        if id.is_empty() {
            return self.storage.get_cards().await;
        }
        Ok(vec![self.storage.get_card(id).await?])
    }

    async fn post_card(&self, mut card: Card, user_id: &str) -> CoreResult<String> {
        if user_id.is_empty() {
            return Err(CoreError::MissingField("UserID"));
        }
        card.id.clear();
        self.storage.create_card(&mut card, user_id).await?;
        Ok(card.id)
    }

    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        self.storage.delete(entity, id).await
    }

    async fn health(&self) -> Vec<Health> {
        let db_status = match self.storage.ping().await {
            Ok(()) => STATUS_OK,
            Err(e) => {
                tracing::warn!(
                    backend = %self.storage.backend_name(),
                    error = %e,
                    "Database health check failed"
                );
                STATUS_ERR
            }
        };

        vec![
            Health::now(APP_COMPONENT, STATUS_OK),
            Health::now(DB_COMPONENT, db_status),
        ]
    }
}
