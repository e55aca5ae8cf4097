//! User type definitions

use serde::{Deserialize, Serialize};

use super::{Address, Card, Links};
use crate::crypto::{calculate_pass_hash, new_salt};
use crate::error::{CoreError, CoreResult};

/// A customer account.
///
/// `password` holds the salted hash once the user has been through
/// [`User::set_password`]. Neither the password nor the salt is ever
/// serialized; the password can still be deserialized from inbound requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(skip)]
    pub salt: String,
    /// Owned addresses. Populated from storage, not part of the outward shape.
    #[serde(skip)]
    pub addresses: Vec<Address>,
    /// Owned cards. Populated from storage, not part of the outward shape.
    #[serde(skip)]
    pub cards: Vec<Card>,
    /// Storage-assigned ID
    #[serde(default)]
    pub id: String,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl User {
    /// Empty user with a freshly generated salt.
    pub fn new() -> Self {
        Self {
            salt: new_salt(),
            ..Self::default()
        }
    }

    /// Check required fields in a fixed order: first name, last name,
    /// username, password. The first empty one is reported.
    pub fn validate(&self) -> CoreResult<()> {
        let required = [
            ("FirstName", &self.first_name),
            ("LastName", &self.last_name),
            ("Username", &self.username),
            ("Password", &self.password),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(CoreError::MissingField(field));
            }
        }
        Ok(())
    }

    /// Regenerate the salt and store the hash of `plain`.
    pub fn set_password(&mut self, plain: &str) {
        self.new_salt();
        self.password = calculate_pass_hash(plain, &self.salt);
    }

    pub fn new_salt(&mut self) {
        self.salt = new_salt();
    }

    pub fn mask_cards(&mut self) {
        for card in &mut self.cards {
            card.mask();
        }
    }

    /// Annotate the user and every owned attribute with links.
    pub fn add_links(&mut self, domain: &str) {
        self.links.add_customer(domain, &self.id);
        for address in &mut self.addresses {
            address.add_links(domain);
        }
        for card in &mut self.cards {
            card.add_links(domain);
        }
    }

    pub fn address_ids(&self) -> Vec<String> {
        self.addresses.iter().map(|a| a.id.clone()).collect()
    }

    pub fn card_ids(&self) -> Vec<String> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }
}
