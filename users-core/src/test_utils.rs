//! Test helpers
//!
//! In-memory mock backend and factory functions shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::services::CoreUserService;
use crate::storage::Storage;
use crate::traits::Database;
use crate::types::{Address, Card, EntityKind, User};

// ===== MockDatabase =====

#[derive(Default)]
struct MockState {
    users: BTreeMap<String, User>,
    addresses: BTreeMap<String, (Address, String)>,
    cards: BTreeMap<String, (Card, String)>,
}

/// Stores everything in ordered maps. Users keep id-only attribute stubs,
/// attributes keep their owner's id.
pub struct MockDatabase {
    state: Mutex<MockState>,
    next_id: AtomicU64,
    init_calls: AtomicUsize,
    /// If Some, `init` fails with this message
    init_error: Mutex<Option<String>>,
    /// If Some, every read fails with this message
    fail_reads: Mutex<Option<String>>,
    /// If Some, `ping` fails with this message
    ping_error: Mutex<Option<String>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            next_id: AtomicU64::new(1),
            init_calls: AtomicUsize::new(0),
            init_error: Mutex::new(None),
            fail_reads: Mutex::new(None),
            ping_error: Mutex::new(None),
        }
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn set_init_error(&self, err: Option<String>) {
        *self.init_error.lock().unwrap() = err;
    }

    pub fn set_fail_reads(&self, err: Option<String>) {
        *self.fail_reads.lock().unwrap() = err;
    }

    pub fn set_ping_error(&self, err: Option<String>) {
        *self.ping_error.lock().unwrap() = err;
    }

    pub fn user_count(&self) -> usize {
        self.state().users.len()
    }

    /// IDs of every address and card still pointing at `owner`.
    pub fn attributes_owned_by(&self, owner: &str) -> Vec<String> {
        let state = self.state();
        let addresses = state
            .addresses
            .iter()
            .filter(|(_, (_, o))| o == owner)
            .map(|(id, _)| id.clone());
        let cards = state
            .cards
            .iter()
            .filter(|(_, (_, o))| o == owner)
            .map(|(id, _)| id.clone());
        addresses.chain(cards).collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn next_id(&self) -> String {
        format!("{:08}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check_reads(&self) -> CoreResult<()> {
        match &*self.fail_reads.lock().unwrap() {
            Some(msg) => Err(CoreError::StorageError(msg.clone())),
            None => Ok(()),
        }
    }
}

fn address_stub(id: &str) -> Address {
    Address {
        id: id.to_string(),
        ..Default::default()
    }
}

fn card_stub(id: &str) -> Card {
    Card {
        id: id.to_string(),
        ..Default::default()
    }
}

#[async_trait]
impl Database for MockDatabase {
    async fn init(&self) -> CoreResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match &*self.init_error.lock().unwrap() {
            Some(msg) => Err(CoreError::StorageError(msg.clone())),
            None => Ok(()),
        }
    }

    async fn get_user_by_name(&self, name: &str) -> CoreResult<User> {
        self.check_reads()?;
        self.state()
            .users
            .values()
            .find(|u| u.username == name)
            .cloned()
            .ok_or_else(|| CoreError::not_found("customers", name))
    }

    async fn get_user(&self, id: &str) -> CoreResult<User> {
        self.check_reads()?;
        self.state()
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("customers", id))
    }

    async fn get_users(&self) -> CoreResult<Vec<User>> {
        self.check_reads()?;
        Ok(self.state().users.values().cloned().collect())
    }

    async fn create_user(&self, user: &mut User) -> CoreResult<()> {
        let mut state = self.state();
        if state.users.values().any(|u| u.username == user.username) {
            return Err(CoreError::UsernameTaken(user.username.clone()));
        }
        user.id = self.next_id();
        for address in &mut user.addresses {
            address.id = self.next_id();
            state
                .addresses
                .insert(address.id.clone(), (address.clone(), user.id.clone()));
        }
        for card in &mut user.cards {
            card.id = self.next_id();
            state
                .cards
                .insert(card.id.clone(), (card.clone(), user.id.clone()));
        }
        let stored = User {
            addresses: user.address_ids().iter().map(|id| address_stub(id)).collect(),
            cards: user.card_ids().iter().map(|id| card_stub(id)).collect(),
            links: Default::default(),
            ..user.clone()
        };
        state.users.insert(user.id.clone(), stored);
        Ok(())
    }

    async fn get_user_attributes(&self, user: &mut User) -> CoreResult<()> {
        self.check_reads()?;
        let state = self.state();
        user.addresses = user
            .address_ids()
            .iter()
            .filter_map(|id| state.addresses.get(id).map(|(a, _)| a.clone()))
            .collect();
        user.cards = user
            .card_ids()
            .iter()
            .filter_map(|id| state.cards.get(id).map(|(c, _)| c.clone()))
            .collect();
        Ok(())
    }

    async fn get_address(&self, id: &str) -> CoreResult<Address> {
        self.check_reads()?;
        self.state()
            .addresses
            .get(id)
            .map(|(a, _)| a.clone())
            .ok_or_else(|| CoreError::not_found("addresses", id))
    }

    async fn get_addresses(&self) -> CoreResult<Vec<Address>> {
        self.check_reads()?;
        Ok(self.state().addresses.values().map(|(a, _)| a.clone()).collect())
    }

    async fn create_address(&self, address: &mut Address, user_id: &str) -> CoreResult<()> {
        let mut state = self.state();
        let id = self.next_id();
        let owner = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| CoreError::not_found("customers", user_id))?;
        owner.addresses.push(address_stub(&id));
        address.id = id;
        state
            .addresses
            .insert(address.id.clone(), (address.clone(), user_id.to_string()));
        Ok(())
    }

    async fn get_card(&self, id: &str) -> CoreResult<Card> {
        self.check_reads()?;
        self.state()
            .cards
            .get(id)
            .map(|(c, _)| c.clone())
            .ok_or_else(|| CoreError::not_found("cards", id))
    }

    async fn get_cards(&self) -> CoreResult<Vec<Card>> {
        self.check_reads()?;
        Ok(self.state().cards.values().map(|(c, _)| c.clone()).collect())
    }

    async fn create_card(&self, card: &mut Card, user_id: &str) -> CoreResult<()> {
        let mut state = self.state();
        let id = self.next_id();
        let owner = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| CoreError::not_found("customers", user_id))?;
        owner.cards.push(card_stub(&id));
        card.id = id;
        state
            .cards
            .insert(card.id.clone(), (card.clone(), user_id.to_string()));
        Ok(())
    }

    async fn delete(&self, entity: &str, id: &str) -> CoreResult<()> {
        let kind =
            EntityKind::parse(entity).ok_or_else(|| CoreError::UnknownEntity(entity.to_string()))?;
        let mut state = self.state();
        match kind {
            EntityKind::Customers => {
                state
                    .users
                    .remove(id)
                    .ok_or_else(|| CoreError::not_found("customers", id))?;
                state.addresses.retain(|_, (_, owner)| owner != id);
                state.cards.retain(|_, (_, owner)| owner != id);
            }
            EntityKind::Addresses => {
                let (_, owner) = state
                    .addresses
                    .remove(id)
                    .ok_or_else(|| CoreError::not_found("addresses", id))?;
                if let Some(user) = state.users.get_mut(&owner) {
                    user.addresses.retain(|a| a.id != id);
                }
            }
            EntityKind::Cards => {
                let (_, owner) = state
                    .cards
                    .remove(id)
                    .ok_or_else(|| CoreError::not_found("cards", id))?;
                if let Some(user) = state.users.get_mut(&owner) {
                    user.cards.retain(|c| c.id != id);
                }
            }
        }
        Ok(())
    }

    async fn ping(&self) -> CoreResult<()> {
        match &*self.ping_error.lock().unwrap() {
            Some(msg) => Err(CoreError::StorageError(msg.clone())),
            None => Ok(()),
        }
    }
}

// ===== Factories =====

/// A user that passes validation, with a plaintext password.
pub fn test_user(username: &str) -> User {
    User {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        password: "password".to_string(),
        ..Default::default()
    }
}

/// Service over a fresh [`MockDatabase`], with the mock handed back for
/// inspection.
pub fn create_test_service() -> (CoreUserService, Arc<MockDatabase>) {
    let db = Arc::new(MockDatabase::new());
    let storage = Storage::new("mock", db.clone(), "example.com");
    (CoreUserService::new(Arc::new(storage)), db)
}
