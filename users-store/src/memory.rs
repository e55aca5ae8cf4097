//! In-process document store.
//!
//! Keeps one map per collection. Customers hold the ids of the addresses and
//! cards they own; attribute documents carry no back-reference. All three
//! maps sit behind a single lock so cascades and owner updates are atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use users_core::error::{CoreError, CoreResult};
use users_core::traits::Database;
use users_core::types::{Address, Card, EntityKind, User};

/// Stored form of a customer: the user without attributes plus the ids of
/// the attributes it owns.
#[derive(Clone)]
struct CustomerDoc {
    user: User,
    addresses: Vec<Uuid>,
    cards: Vec<Uuid>,
}

impl CustomerDoc {
    /// Rebuild the user with id-only attribute entries.
    fn to_user(&self) -> User {
        User {
            addresses: self
                .addresses
                .iter()
                .map(|id| Address {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            cards: self
                .cards
                .iter()
                .map(|id| Card {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..self.user.clone()
        }
    }
}

#[derive(Default)]
struct Collections {
    customers: BTreeMap<Uuid, CustomerDoc>,
    addresses: BTreeMap<Uuid, Address>,
    cards: BTreeMap<Uuid, Card>,
}

/// Memory-backed `Database`.
///
/// Ids are UUID v4 strings; anything else is rejected with
/// `CoreError::InvalidId`. Contents live as long as the store.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_id(id: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| CoreError::InvalidId(id.to_string()))
}

/// Copy of `address` as stored: id set, no links.
fn address_doc(address: &Address, id: Uuid) -> Address {
    Address {
        id: id.to_string(),
        links: Default::default(),
        ..address.clone()
    }
}

fn card_doc(card: &Card, id: Uuid) -> Card {
    Card {
        id: id.to_string(),
        links: Default::default(),
        ..card.clone()
    }
}

#[async_trait]
impl Database for MemoryStore {
    async fn init(&self) -> CoreResult<()> {
        log::debug!("Memory store ready");
        Ok(())
    }

    async fn get_user_by_name(&self, name: &str) -> CoreResult<User> {
        let collections = self.collections.read().await;
        collections
            .customers
            .values()
            .find(|doc| doc.user.username == name)
            .map(CustomerDoc::to_user)
            .ok_or_else(|| CoreError::not_found(EntityKind::Customers.as_str(), name))
    }

    async fn get_user(&self, id: &str) -> CoreResult<User> {
        let key = parse_id(id)?;
        let collections = self.collections.read().await;
        collections
            .customers
            .get(&key)
            .map(CustomerDoc::to_user)
            .ok_or_else(|| CoreError::not_found(EntityKind::Customers.as_str(), id))
    }

    async fn get_users(&self) -> CoreResult<Vec<User>> {
        let collections = self.collections.read().await;
        Ok(collections.customers.values().map(CustomerDoc::to_user).collect())
    }

    async fn create_user(&self, user: &mut User) -> CoreResult<()> {
        let mut collections = self.collections.write().await;
        if collections
            .customers
            .values()
            .any(|doc| doc.user.username == user.username)
        {
            return Err(CoreError::UsernameTaken(user.username.clone()));
        }

        let id = Uuid::new_v4();
        user.id = id.to_string();

        let mut address_ids = Vec::with_capacity(user.addresses.len());
        for address in &mut user.addresses {
            let address_id = Uuid::new_v4();
            address.id = address_id.to_string();
            collections
                .addresses
                .insert(address_id, address_doc(address, address_id));
            address_ids.push(address_id);
        }
        let mut card_ids = Vec::with_capacity(user.cards.len());
        for card in &mut user.cards {
            let card_id = Uuid::new_v4();
            card.id = card_id.to_string();
            collections.cards.insert(card_id, card_doc(card, card_id));
            card_ids.push(card_id);
        }

        let stored = User {
            addresses: Vec::new(),
            cards: Vec::new(),
            links: Default::default(),
            ..user.clone()
        };
        collections.customers.insert(
            id,
            CustomerDoc {
                user: stored,
                addresses: address_ids,
                cards: card_ids,
            },
        );
        log::debug!("Created customer {id}");
        Ok(())
    }

    async fn get_user_attributes(&self, user: &mut User) -> CoreResult<()> {
        let collections = self.collections.read().await;

        let mut addresses = Vec::with_capacity(user.addresses.len());
        for stub in &user.addresses {
            let key = parse_id(&stub.id)?;
            match collections.addresses.get(&key) {
                Some(address) => addresses.push(address.clone()),
                None => log::warn!("Customer {} references missing address {key}", user.id),
            }
        }
        let mut cards = Vec::with_capacity(user.cards.len());
        for stub in &user.cards {
            let key = parse_id(&stub.id)?;
            match collections.cards.get(&key) {
                Some(card) => cards.push(card.clone()),
                None => log::warn!("Customer {} references missing card {key}", user.id),
            }
        }

        user.addresses = addresses;
        user.cards = cards;
        Ok(())
    }

    async fn get_address(&self, id: &str) -> CoreResult<Address> {
        let key = parse_id(id)?;
        let collections = self.collections.read().await;
        collections
            .addresses
            .get(&key)
            .cloned()
            .ok_or_else(|| CoreError::not_found(EntityKind::Addresses.as_str(), id))
    }

    async fn get_addresses(&self) -> CoreResult<Vec<Address>> {
        let collections = self.collections.read().await;
        Ok(collections.addresses.values().cloned().collect())
    }

    async fn create_address(&self, address: &mut Address, user_id: &str) -> CoreResult<()> {
        let owner = parse_id(user_id)?;
        let mut collections = self.collections.write().await;
        let id = Uuid::new_v4();
        let doc = collections
            .customers
            .get_mut(&owner)
            .ok_or_else(|| CoreError::not_found(EntityKind::Customers.as_str(), user_id))?;
        doc.addresses.push(id);
        address.id = id.to_string();
        collections.addresses.insert(id, address_doc(address, id));
        Ok(())
    }

    async fn get_card(&self, id: &str) -> CoreResult<Card> {
        let key = parse_id(id)?;
        let collections = self.collections.read().await;
        collections
            .cards
            .get(&key)
            .cloned()
            .ok_or_else(|| CoreError::not_found(EntityKind::Cards.as_str(), id))
    }

    async fn get_cards(&self) -> CoreResult<Vec<Card>> {
        let collections = self.collections.read().await;
        Ok(collections.cards.values().cloned().collect())
    }

    async fn create_card(&self, card: &mut Card, user_id: &str) -> CoreResult<()> {
        let owner = parse_id(user_id)?;
        let mut collections = self.collections.write().await;
        let id = Uuid::new_v4();
        let doc = collections
            .customers
            .get_mut(&owner)
            .ok_or_else(|| CoreError::not_found(EntityKind::Customers.as_str(), user_id))?;
        doc.cards.push(id);
        card.id = id.to_string();
        collections.cards.insert(id, card_doc(card, id));
        Ok(())
    }

    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        let kind =
            EntityKind::parse(entity).ok_or_else(|| CoreError::UnknownEntity(entity.to_string()))?;
        let key = parse_id(id)?;
        let mut collections = self.collections.write().await;

        match kind {
            EntityKind::Customers => {
                let doc = collections
                    .customers
                    .remove(&key)
                    .ok_or_else(|| CoreError::not_found(kind.as_str(), id))?;
                for address in &doc.addresses {
                    collections.addresses.remove(address);
                }
                for card in &doc.cards {
                    collections.cards.remove(card);
                }
            }
            EntityKind::Addresses => {
                collections
                    .addresses
                    .remove(&key)
                    .ok_or_else(|| CoreError::not_found(kind.as_str(), id))?;
                for doc in collections.customers.values_mut() {
                    doc.addresses.retain(|a| *a != key);
                }
            }
            EntityKind::Cards => {
                collections
                    .cards
                    .remove(&key)
                    .ok_or_else(|| CoreError::not_found(kind.as_str(), id))?;
                for doc in collections.customers.values_mut() {
                    doc.cards.retain(|c| *c != key);
                }
            }
        }

        log::debug!("Deleted {kind} {id}");
        Ok(())
    }

    async fn ping(&self) -> CoreResult<()> {
        Ok(())
    }
}
