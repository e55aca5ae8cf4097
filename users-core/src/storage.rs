//! Active storage backend facade
//!
//! Every read that returns users, addresses or cards goes through here and
//! leaves with its HATEOAS links filled in, so no caller can forget to
//! annotate them.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::traits::Database;
use crate::types::{Address, Card, User};

/// The backend chosen at startup plus the domain used for links.
///
/// Created by [`crate::traits::BackendRegistry::select`]; immutable afterwards
/// and shared by the service through `Arc`.
pub struct Storage {
    name: String,
    backend: Arc<dyn Database>,
    link_domain: String,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("name", &self.name)
            .field("link_domain", &self.link_domain)
            .finish_non_exhaustive()
    }
}

impl Storage {
    /// Bind an already initialized backend.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn Database>,
        link_domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            link_domain: link_domain.into(),
        }
    }

    /// Registry name of the active backend
    pub fn backend_name(&self) -> &str {
        &self.name
    }

    pub fn link_domain(&self) -> &str {
        &self.link_domain
    }

    pub async fn get_user_by_name(&self, name: &str) -> CoreResult<User> {
        let mut user = self.backend.get_user_by_name(name).await?;
        user.add_links(&self.link_domain);
        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> CoreResult<User> {
        let mut user = self.backend.get_user(id).await?;
        user.add_links(&self.link_domain);
        Ok(user)
    }

    pub async fn get_users(&self) -> CoreResult<Vec<User>> {
        let mut users = self.backend.get_users().await?;
        for user in &mut users {
            user.add_links(&self.link_domain);
        }
        Ok(users)
    }

    pub async fn create_user(&self, user: &mut User) -> CoreResult<()> {
        self.backend.create_user(user).await?;
        user.add_links(&self.link_domain);
        Ok(())
    }

    /// Resolve the user's addresses and cards and link them.
    pub async fn get_user_attributes(&self, user: &mut User) -> CoreResult<()> {
        self.backend.get_user_attributes(user).await?;
        user.add_links(&self.link_domain);
        Ok(())
    }

    pub async fn get_address(&self, id: &str) -> CoreResult<Address> {
        let mut address = self.backend.get_address(id).await?;
        address.add_links(&self.link_domain);
        Ok(address)
    }

    pub async fn get_addresses(&self) -> CoreResult<Vec<Address>> {
        let mut addresses = self.backend.get_addresses().await?;
        for address in &mut addresses {
            address.add_links(&self.link_domain);
        }
        Ok(addresses)
    }

    pub async fn create_address(&self, address: &mut Address, user_id: &str) -> CoreResult<()> {
        self.backend.create_address(address, user_id).await?;
        address.add_links(&self.link_domain);
        Ok(())
    }

    pub async fn get_card(&self, id: &str) -> CoreResult<Card> {
        let mut card = self.backend.get_card(id).await?;
        card.add_links(&self.link_domain);
        Ok(card)
    }

    pub async fn get_cards(&self) -> CoreResult<Vec<Card>> {
        let mut cards = self.backend.get_cards().await?;
        for card in &mut cards {
            card.add_links(&self.link_domain);
        }
        Ok(cards)
    }

    pub async fn create_card(&self, card: &mut Card, user_id: &str) -> CoreResult<()> {
        self.backend.create_card(card, user_id).await?;
        card.add_links(&self.link_domain);
        Ok(())
    }

    pub async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        self.backend.delete(entity, id).await
    }

    pub async fn ping(&self) -> CoreResult<()> {
        self.backend.ping().await
    }
}
